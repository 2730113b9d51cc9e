//! Prelude module - common imports for xlmap users
//!
//! ```rust
//! use xlmap::prelude::*;
//! ```

pub use crate::{
    // Callables
    Callable,
    // Cell types
    CellArray,
    CellError,
    CellValue,
    // Error types
    Error,
    // Registrations
    ArrayMapping,
    FunctionRegistration,
    // Extension traits
    MapArrayFunctionsExt,
    MapArrayOptions,
    // Conversions
    Adaptation,
    ParameterConversionConfiguration,
    // Records
    Record,
    RecordBuilder,
    Result,
    // Type model
    Value,
    ValueType,
};
