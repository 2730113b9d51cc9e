//! Declared types and runtime values
//!
//! [`ValueType`] describes what a callable declares for a parameter, a return
//! value or a record property. [`Value`] is what actually flows through a
//! call at runtime.

use crate::cell::{CellArray, CellValue};
use crate::error::{Error, Result};
use crate::record::{Record, RecordType, RecordValue};
use chrono::NaiveDateTime;
use std::fmt;

/// A declared type
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    Boolean,
    Double,
    Int32,
    Int64,
    String,
    DateTime,
    /// A 2-D array of cells
    CellArray,
    /// A record type described by the [`Record`] trait
    Record(RecordType),
    /// A lazily evaluated sequence of the element type
    Sequence(Box<ValueType>),
    /// Any other generic shape, kept by name and type arguments
    Generic { name: String, args: Vec<ValueType> },
}

impl ValueType {
    /// Sequence of the given element type
    pub fn sequence_of(element: ValueType) -> Self {
        ValueType::Sequence(Box::new(element))
    }

    /// Sequence of records of type `T`
    pub fn records<T: Record>() -> Self {
        ValueType::sequence_of(ValueType::Record(RecordType::of::<T>()))
    }

    /// Element type, if this is a sequence
    pub fn element_type(&self) -> Option<&ValueType> {
        match self {
            ValueType::Sequence(element) => Some(element),
            _ => None,
        }
    }

    /// Record type, if this is a record
    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            ValueType::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Whether this is a scalar type that fits in a single cell
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ValueType::Boolean
                | ValueType::Double
                | ValueType::Int32
                | ValueType::Int64
                | ValueType::String
                | ValueType::DateTime
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Boolean => write!(f, "Boolean"),
            ValueType::Double => write!(f, "Double"),
            ValueType::Int32 => write!(f, "Int32"),
            ValueType::Int64 => write!(f, "Int64"),
            ValueType::String => write!(f, "String"),
            ValueType::DateTime => write!(f, "DateTime"),
            ValueType::CellArray => write!(f, "CellArray"),
            ValueType::Record(record) => write!(f, "{}", record.name()),
            ValueType::Sequence(element) => write!(f, "Sequence<{element}>"),
            ValueType::Generic { name, args } => {
                write!(f, "{name}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
        }
    }
}

/// A runtime value passed to or returned from a callable
pub enum Value {
    Empty,
    Boolean(bool),
    Double(f64),
    Int32(i32),
    Int64(i64),
    String(String),
    DateTime(NaiveDateTime),
    Array(CellArray),
    Record(RecordValue),
    Sequence(Sequence),
}

impl Value {
    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Boolean(_) => "boolean",
            Value::Double(_) => "double",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Sequence(_) => "sequence",
        }
    }

    /// Convert a scalar into the cell the host expects
    ///
    /// Arrays, records and sequences have no single-cell form.
    pub fn to_cell(&self) -> Option<CellValue> {
        match self {
            Value::Empty => Some(CellValue::Empty),
            Value::Boolean(b) => Some(CellValue::Boolean(*b)),
            Value::Double(n) => Some(CellValue::Number(*n)),
            Value::Int32(n) => Some(CellValue::from(*n)),
            Value::Int64(n) => Some(CellValue::from(*n)),
            Value::String(s) => Some(CellValue::string(s)),
            Value::DateTime(dt) => Some(CellValue::DateTime(*dt)),
            Value::Array(_) | Value::Record(_) | Value::Sequence(_) => None,
        }
    }

    /// Unwrap a cell array argument
    pub fn into_array(self) -> Result<CellArray> {
        match self {
            Value::Array(array) => Ok(array),
            other => Err(Error::argument_type("array", other.type_name())),
        }
    }

    /// Unwrap a sequence argument
    pub fn into_sequence(self) -> Result<Sequence> {
        match self {
            Value::Sequence(seq) => Ok(seq),
            other => Err(Error::argument_type("sequence", other.type_name())),
        }
    }

    /// Unwrap a sequence of records of type `T`
    pub fn into_records<T: Record>(self) -> Result<Vec<T>> {
        self.into_sequence()?
            .map(|value| match value {
                Value::Record(record) => record.downcast::<T>().map_err(|other| {
                    Error::argument_type(RecordType::of::<T>().name(), other.record_type().name())
                }),
                other => Err(Error::argument_type("record", other.type_name())),
            })
            .collect()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "Empty"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Value::Int32(n) => f.debug_tuple("Int32").field(n).finish(),
            Value::Int64(n) => f.debug_tuple("Int64").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            Value::Array(a) => f.debug_tuple("Array").field(a).finish(),
            Value::Record(r) => f.debug_tuple("Record").field(r).finish(),
            Value::Sequence(_) => write!(f, "Sequence(..)"),
        }
    }
}

impl From<CellArray> for Value {
    fn from(array: CellArray) -> Self {
        Value::Array(array)
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Sequence(seq)
    }
}

/// A single-pass, lazily evaluated stream of values
///
/// Its length is unknown until it has been consumed.
pub struct Sequence(Box<dyn Iterator<Item = Value>>);

impl Sequence {
    /// Wrap any iterator of values
    pub fn new<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Sequence(Box::new(iter.into_iter()))
    }

    /// Wrap an iterator of typed records
    pub fn from_records<T, I>(iter: I) -> Self
    where
        T: Record,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Sequence::new(iter.into_iter().map(|r| Value::Record(RecordValue::new(r))))
    }
}

impl Iterator for Sequence {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Scalar Rust types that can be used as record properties
pub trait Field: Sized + 'static {
    /// Declared type of the field
    fn value_type() -> ValueType;

    /// Extract the field from a value of its declared type
    fn from_value(value: Value) -> Result<Self>;

    /// Wrap the field as a value
    fn into_value(self) -> Value;

    /// Cell representation for output arrays
    fn to_cell(&self) -> CellValue;
}

macro_rules! impl_field {
    ($ty:ty, $variant:ident, $to_cell:expr) => {
        impl Field for $ty {
            fn value_type() -> ValueType {
                ValueType::$variant
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(Error::argument_type(
                        ValueType::$variant,
                        other.type_name(),
                    )),
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn to_cell(&self) -> CellValue {
                let to_cell: fn(&$ty) -> CellValue = $to_cell;
                to_cell(self)
            }
        }
    };
}

impl_field!(bool, Boolean, |b| CellValue::Boolean(*b));
impl_field!(f64, Double, |n| CellValue::Number(*n));
impl_field!(i32, Int32, |n| CellValue::from(*n));
impl_field!(i64, Int64, |n| CellValue::from(*n));
impl_field!(String, String, |s| CellValue::string(s));
impl_field!(NaiveDateTime, DateTime, |dt| CellValue::DateTime(*dt));
