//! Error types for xlmap

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by a user function body
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while shimming or calling registered functions
#[derive(Debug, Error)]
pub enum Error {
    /// A declared type is not a single-argument sequence
    #[error("Type {ty} is not a sequence of records")]
    InvalidShape { ty: String },

    /// A record type exposes no declared properties
    #[error("Unsupported record type {record} with 0 public properties")]
    EmptyRecord { record: String },

    /// A callable has the wrong number of parameters for the requested shim
    #[error("Unsupported target with {actual} parameters (expected {expected})")]
    Arity { expected: usize, actual: usize },

    /// A registration has a parameter count no shim supports
    #[error("Unsupported target with {0} parameters")]
    UnsupportedArity(usize),

    /// A cell array arrived without a header row
    #[error("Input array {argument} has no rows; a header row is required")]
    EmptyInput { argument: usize },

    /// A cell could not be converted to the declared type
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A record could not be built from a data row
    #[error("Failed to build input record {argument} at row {row}, property {property}")]
    RecordBuild {
        argument: usize,
        row: usize,
        property: String,
        #[source]
        source: Box<Error>,
    },

    /// The wrapped function failed
    #[error("Target function failed")]
    TargetInvocation {
        #[source]
        source: Box<Error>,
    },

    /// Parameter descriptions disagree with the registration
    #[error("Unexpected number of parameter registrations {descriptions} vs {registrations}")]
    CountMismatch {
        descriptions: usize,
        registrations: usize,
    },

    /// Invalid argument supplied at configuration time
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A callable was invoked with the wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// A callable was invoked with an argument of the wrong type
    #[error("Invalid value type: expected {expected}, got {actual}")]
    ArgumentType { expected: String, actual: String },

    /// A cell array was built from rows of unequal length
    #[error("Row {row} has {actual} cells (expected {expected})")]
    RaggedArray {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A cell position is outside the array
    #[error("Cell ({row}, {col}) out of bounds ({rows} x {cols})")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// A column header matching a constructor parameter is missing
    #[error("No column matches property {0}")]
    UnboundColumn(String),

    /// A record type cannot be default-constructed
    #[error("Record type {0} has no matching constructor and no default constructor")]
    NoConstructor(String),

    /// A property cannot be written
    #[error("Property {0} is read-only")]
    ReadOnlyProperty(String),

    /// Error raised by a user function or constructor body
    #[error("{0}")]
    Function(BoxError),
}

impl Error {
    /// Wrap an error raised by user code
    pub fn function<E: Into<BoxError>>(err: E) -> Self {
        Error::Function(err.into())
    }

    /// Create an argument type error
    pub fn argument_type(expected: impl ToString, actual: impl ToString) -> Self {
        Error::ArgumentType {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// A cell value could not be converted to a declared type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Cannot convert {from} value to {to}: {reason}")]
pub struct ConversionError {
    /// Type name of the source cell
    pub from: &'static str,
    /// Declared target type
    pub to: String,
    /// Why the conversion failed
    pub reason: String,
}

impl ConversionError {
    /// Create a new conversion error
    pub fn new(from: &'static str, to: impl ToString, reason: impl Into<String>) -> Self {
        Self {
            from,
            to: to.to_string(),
            reason: reason.into(),
        }
    }
}
