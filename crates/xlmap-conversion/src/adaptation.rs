//! Value adaptations

use std::fmt;
use std::sync::Arc;
use xlmap_core::{Field, Result, Value, ValueType};

type ConvertFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// A conversion from values of one declared type to another
#[derive(Clone)]
pub struct Adaptation {
    from: ValueType,
    to: ValueType,
    convert: ConvertFn,
}

impl Adaptation {
    pub fn new<F>(from: ValueType, to: ValueType, convert: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            from,
            to,
            convert: Arc::new(convert),
        }
    }

    /// Adaptation from a typed conversion function
    pub fn typed<A, B, F>(convert: F) -> Self
    where
        A: Field,
        B: Field,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        Self::new(A::value_type(), B::value_type(), move |value| {
            Ok(convert(A::from_value(value)?).into_value())
        })
    }

    pub fn from_type(&self) -> &ValueType {
        &self.from
    }

    pub fn to_type(&self) -> &ValueType {
        &self.to
    }

    /// Convert one value
    pub fn apply(&self, value: Value) -> Result<Value> {
        (self.convert)(value)
    }

    /// Chain `next` after this adaptation
    pub fn then(self, next: Adaptation) -> Adaptation {
        let Adaptation { from, convert, .. } = self;
        let Adaptation {
            to,
            convert: next_convert,
            ..
        } = next;
        Adaptation::new(from, to, move |value| next_convert(convert(value)?))
    }
}

impl fmt::Debug for Adaptation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adaptation")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}
