//! Callables
//!
//! A [`Callable`] is a named function body together with its declared
//! parameter and return types. Registrations carry one, and the array shims
//! wrap one.

use crate::error::{BoxError, Error, Result};
use crate::record::Record;
use crate::types::{Sequence, Value, ValueType};
use std::fmt;
use std::sync::Arc;

type Body = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// A declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub value_type: ValueType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// A function with declared parameter and return types
///
/// Cloning is cheap: the body is shared.
#[derive(Clone)]
pub struct Callable {
    name: String,
    parameters: Vec<Parameter>,
    return_type: ValueType,
    body: Body,
}

impl Callable {
    /// Create a callable from an untyped body
    pub fn new<F>(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: ValueType,
        body: F,
    ) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters,
            return_type,
            body: Arc::new(body),
        }
    }

    /// Wrap a function from a sequence of `A` records to a sequence of `C`
    /// records
    pub fn map_records<A, C, F, I>(name: impl Into<String>, f: F) -> Self
    where
        A: Record,
        C: Record,
        F: Fn(Vec<A>) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = C>,
        I::IntoIter: 'static,
    {
        Self::try_map_records(name, move |input: Vec<A>| Ok::<_, BoxError>(f(input)))
    }

    /// Like [`Callable::map_records`], for a fallible function
    pub fn try_map_records<A, C, F, I, E>(name: impl Into<String>, f: F) -> Self
    where
        A: Record,
        C: Record,
        F: Fn(Vec<A>) -> std::result::Result<I, E> + Send + Sync + 'static,
        I: IntoIterator<Item = C>,
        I::IntoIter: 'static,
        E: Into<BoxError>,
    {
        Self::new(
            name,
            vec![Parameter::new("input", ValueType::records::<A>())],
            ValueType::records::<C>(),
            move |args: Vec<Value>| {
                let [input]: [Value; 1] = unpack(args)?;
                let output = f(input.into_records::<A>()?).map_err(Error::function)?;
                Ok(Value::Sequence(Sequence::from_records(output)))
            },
        )
    }

    /// Wrap a function from sequences of `A` and `B` records to a sequence
    /// of `C` records
    pub fn zip_records<A, B, C, F, I>(name: impl Into<String>, f: F) -> Self
    where
        A: Record,
        B: Record,
        C: Record,
        F: Fn(Vec<A>, Vec<B>) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = C>,
        I::IntoIter: 'static,
    {
        Self::try_zip_records(name, move |a: Vec<A>, b: Vec<B>| {
            Ok::<_, BoxError>(f(a, b))
        })
    }

    /// Like [`Callable::zip_records`], for a fallible function
    pub fn try_zip_records<A, B, C, F, I, E>(name: impl Into<String>, f: F) -> Self
    where
        A: Record,
        B: Record,
        C: Record,
        F: Fn(Vec<A>, Vec<B>) -> std::result::Result<I, E> + Send + Sync + 'static,
        I: IntoIterator<Item = C>,
        I::IntoIter: 'static,
        E: Into<BoxError>,
    {
        Self::new(
            name,
            vec![
                Parameter::new("input1", ValueType::records::<A>()),
                Parameter::new("input2", ValueType::records::<B>()),
            ],
            ValueType::records::<C>(),
            move |args: Vec<Value>| {
                let [first, second]: [Value; 2] = unpack(args)?;
                let output = f(first.into_records::<A>()?, second.into_records::<B>()?)
                    .map_err(Error::function)?;
                Ok(Value::Sequence(Sequence::from_records(output)))
            },
        )
    }

    /// Rename the parameters, in order
    ///
    /// Extra names are ignored; missing names keep the current ones.
    pub fn with_parameter_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        for (parameter, name) in self.parameters.iter_mut().zip(names) {
            parameter.name = name.into();
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn return_type(&self) -> &ValueType {
        &self.return_type
    }

    /// Call the body
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArgumentCount`] when the number of arguments does not
    /// match the declared parameters, otherwise whatever the body returns.
    pub fn invoke(&self, args: Vec<Value>) -> Result<Value> {
        if args.len() != self.parameters.len() {
            return Err(Error::ArgumentCount {
                function: self.name.clone(),
                expected: self.parameters.len(),
                actual: args.len(),
            });
        }
        (self.body)(args)
    }

    /// Whether both callables share the same body
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

fn unpack<const N: usize>(args: Vec<Value>) -> Result<[Value; N]> {
    let actual = args.len();
    args.try_into().map_err(|_| Error::ArgumentCount {
        function: "record function".to_string(),
        expected: N,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordBuilder, RecordValue};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Num {
        n: f64,
    }

    impl Record for Num {
        fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
            builder.property("N", |r| r.n, |r, v| r.n = v).with_default()
        }
    }

    fn nums(values: &[f64]) -> Value {
        Value::Sequence(Sequence::from_records(
            values.iter().map(|&n| Num { n }).collect::<Vec<_>>(),
        ))
    }

    #[test]
    fn test_map_records_signature() {
        let double = Callable::map_records("Double", |input: Vec<Num>| {
            input.into_iter().map(|r| Num { n: r.n * 2.0 }).collect::<Vec<_>>()
        });
        assert_eq!(double.name(), "Double");
        assert_eq!(double.parameter_count(), 1);
        assert_eq!(double.parameters()[0].name, "input");
        assert_eq!(double.parameters()[0].value_type, ValueType::records::<Num>());
        assert_eq!(double.return_type(), &ValueType::records::<Num>());
    }

    #[test]
    fn test_map_records_invoke() {
        let double = Callable::map_records("Double", |input: Vec<Num>| {
            input.into_iter().map(|r| Num { n: r.n * 2.0 }).collect::<Vec<_>>()
        });
        let out = double
            .invoke(vec![nums(&[1.0, 2.5])])
            .unwrap()
            .into_records::<Num>()
            .unwrap();
        assert_eq!(out, vec![Num { n: 2.0 }, Num { n: 5.0 }]);
    }

    #[test]
    fn test_zip_records_invoke() {
        let concat = Callable::zip_records("Concat", |a: Vec<Num>, b: Vec<Num>| {
            a.into_iter().chain(b).collect::<Vec<_>>()
        })
        .with_parameter_names(["left", "right"]);
        assert_eq!(concat.parameters()[1].name, "right");

        let out = concat
            .invoke(vec![nums(&[1.0]), nums(&[2.0, 3.0])])
            .unwrap()
            .into_records::<Num>()
            .unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_invoke_checks_argument_count() {
        let identity = Callable::map_records("Id", |input: Vec<Num>| input);
        assert!(matches!(
            identity.invoke(vec![]),
            Err(Error::ArgumentCount { expected: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn test_invoke_rejects_wrong_argument_type() {
        let identity = Callable::map_records("Id", |input: Vec<Num>| input);
        assert!(matches!(
            identity.invoke(vec![Value::Double(1.0)]),
            Err(Error::ArgumentType { .. })
        ));
    }

    #[test]
    fn test_try_map_records_wraps_failure() {
        let failing = Callable::try_map_records("Fail", |_: Vec<Num>| {
            Err::<Vec<Num>, _>("no data")
        });
        let err = failing.invoke(vec![nums(&[])]).unwrap_err();
        assert!(matches!(err, Error::Function(_)));
        assert_eq!(err.to_string(), "no data");
    }

    #[test]
    fn test_ptr_eq() {
        let a = Callable::map_records("Id", |input: Vec<Num>| input);
        let b = a.clone();
        let c = Callable::map_records("Id", |input: Vec<Num>| input);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn test_untyped_callable() {
        let count = Callable::new(
            "Count",
            vec![Parameter::new("input", ValueType::records::<Num>())],
            ValueType::Int32,
            |args| {
                let n = args.into_iter().next().map_or(0, |v| match v {
                    Value::Sequence(seq) => seq.count(),
                    _ => 0,
                });
                Ok(Value::Int32(n as i32))
            },
        );
        let seq = Sequence::new(vec![Value::Record(RecordValue::new(Num::default()))]);
        assert!(matches!(
            count.invoke(vec![Value::Sequence(seq)]),
            Ok(Value::Int32(1))
        ));
    }
}
