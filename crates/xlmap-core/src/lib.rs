//! # xlmap-core
//!
//! Core data structures for the xlmap registration extension.
//!
//! This crate provides the fundamental types used throughout xlmap:
//! - [`CellValue`] and [`CellArray`] - Values handed over by the host
//! - [`ValueType`] and [`Value`] - Declared types and runtime values
//! - [`Record`] and [`RecordType`] - Record descriptors, cached per type
//! - [`Callable`] - Functions with declared parameter and return types
//! - [`FunctionRegistration`] - Mutable descriptors of worksheet functions
//! - [`coerce`] - Conversion of raw cells to declared types
//!
//! ## Example
//!
//! ```rust
//! use xlmap_core::{coerce, CellArray, CellValue, Value, ValueType};
//!
//! let array = CellArray::from_rows(vec![
//!     vec![CellValue::from("When")],
//!     vec![CellValue::from(41910.0)],
//! ])
//! .unwrap();
//!
//! let raw = array.get(1, 0).unwrap();
//! let value = coerce(raw, &ValueType::DateTime).unwrap();
//! assert!(matches!(value, Value::DateTime(_)));
//! ```

pub mod callable;
pub mod cell;
pub mod convert;
pub mod date;
pub mod error;
pub mod record;
pub mod registration;
pub mod types;

// Re-exports for convenience
pub use callable::{Callable, Parameter};
pub use cell::{CellArray, CellError, CellValue, SharedString};
pub use convert::coerce;
pub use error::{BoxError, ConversionError, Error, Result};
pub use record::{
    Constructor, ConstructorArgs, PropertyDescriptor, PropertyOrigin, Record, RecordBuilder,
    RecordType, RecordValue,
};
pub use registration::{
    ArgumentAttributes, ArrayMapping, FunctionAttributes, FunctionRegistration,
    ParameterRegistration, ReturnRegistration,
};
pub use types::{Field, Sequence, Value, ValueType};
