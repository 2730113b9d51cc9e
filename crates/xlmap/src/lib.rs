//! # xlmap
//!
//! Expose functions over typed record sequences as spreadsheet array
//! functions.
//!
//! A worksheet passes ranges to add-in functions as 2-D arrays of cells.
//! xlmap lets you write those functions over sequences of plain Rust records
//! instead, and generates the adapter:
//!
//! - the first row of each input range is a header row, matched to the
//!   record's properties ignoring case and column order
//! - each following row becomes one record, with cells coerced to the
//!   property types (numbers bound to date/time properties are read as
//!   serial dates)
//! - the returned records are written back out under a header row of the
//!   output record's property names
//!
//! Parameter and return value conversions for other functions can be
//! declared with [`ParameterConversionConfiguration`].
//!
//! ## Example
//!
//! ```rust
//! use xlmap::prelude::*;
//!
//! #[derive(Debug, Default, Clone)]
//! struct Trade {
//!     symbol: String,
//!     qty: f64,
//! }
//!
//! impl Record for Trade {
//!     fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
//!         builder
//!             .property("Symbol", |t| t.symbol.clone(), |t, v| t.symbol = v)
//!             .property("Qty", |t| t.qty, |t, v| t.qty = v)
//!             .with_default()
//!     }
//! }
//!
//! let largest = Callable::map_records("Largest", |mut trades: Vec<Trade>| {
//!     trades.sort_by(|a, b| b.qty.total_cmp(&a.qty));
//!     trades.into_iter().take(1).collect::<Vec<_>>()
//! });
//!
//! let registrations: Vec<_> =
//!     vec![FunctionRegistration::new("LARGEST", largest).with_array_mapping()]
//!         .into_iter()
//!         .process_map_array_functions()
//!         .collect();
//!
//! let input = CellArray::from_rows(vec![
//!     vec![CellValue::from("qty"), CellValue::from("symbol")],
//!     vec![CellValue::from(10.0), CellValue::from("ABC")],
//!     vec![CellValue::from(25.0), CellValue::from("XYZ")],
//! ])
//! .unwrap();
//!
//! let output = registrations[0]
//!     .callable
//!     .invoke(vec![Value::Array(input)])
//!     .unwrap()
//!     .into_array()
//!     .unwrap();
//!
//! assert_eq!(output.get(0, 0), Some(&CellValue::from("Symbol")));
//! assert_eq!(output.get(1, 0), Some(&CellValue::from("XYZ")));
//! ```

pub mod prelude;

// Re-export core types
pub use xlmap_core::{
    coerce,
    date,
    ArgumentAttributes,
    ArrayMapping,
    BoxError,
    // Callables
    Callable,
    // Cell types
    CellArray,
    CellError,
    CellValue,
    Constructor,
    ConstructorArgs,
    ConversionError,
    // Error types
    Error,
    Field,
    FunctionAttributes,
    // Registrations
    FunctionRegistration,
    Parameter,
    ParameterRegistration,
    PropertyDescriptor,
    PropertyOrigin,
    // Records
    Record,
    RecordBuilder,
    RecordType,
    RecordValue,
    Result,
    ReturnRegistration,
    Sequence,
    SharedString,
    // Type model
    Value,
    ValueType,
};

// Re-export array mapping
pub use xlmap_array::{
    describe_record_fields, make_array_shim_1to1, make_array_shim_2to1,
    process_map_array_functions, process_map_array_functions_with, reflect, try_shim,
    ArrayShim1To1, ArrayShim2To1, MapArrayFunctions, MapArrayFunctionsExt, MapArrayOptions,
    ShimmedRegistration,
};

// Re-export conversion configuration
pub use xlmap_conversion::{
    Adaptation, Conversion, ParameterConversion, ParameterConversionConfiguration,
    ReturnConversion, Rule,
};
