//! Array shims
//!
//! A shim adapts a callable over record sequences to a callable over cell
//! arrays. Building a shim reflects the record types once; every call binds
//! the header row afresh, since callers may pass columns in any order.

use crate::reflect::reflect;
use xlmap_core::{
    coerce, CellArray, CellValue, Callable, Constructor, Error, Parameter, PropertyDescriptor,
    RecordType, RecordValue, Result, Sequence, Value, ValueType,
};

/// Property name reported when the constructor itself fails
const CONSTRUCTOR: &str = "(constructor)";

/// Reflected shape of one side of a shim
#[derive(Debug, Clone)]
struct RecordSchema {
    record_type: RecordType,
    properties: Vec<PropertyDescriptor>,
}

impl RecordSchema {
    fn reflect(sequence_type: &ValueType) -> Result<Self> {
        let (record_type, properties) = reflect(sequence_type)?;
        Ok(Self {
            record_type,
            properties,
        })
    }

    /// Build one record per data row of `array`
    fn hydrate(&self, array: &CellArray, argument: usize) -> Result<Sequence> {
        if array.row_count() == 0 {
            return Err(Error::EmptyInput { argument });
        }

        let columns: Vec<Option<usize>> = self
            .properties
            .iter()
            .map(|p| array.find_header(p.name()))
            .collect();
        tracing::trace!(
            argument,
            record = %self.record_type.name(),
            columns = ?columns,
            "bound input columns"
        );

        let types: Vec<&ValueType> = self.properties.iter().map(|p| p.value_type()).collect();
        let constructor = self.record_type.find_constructor(&types);

        let mut records = Vec::with_capacity(array.row_count() - 1);
        for row in 1..array.row_count() {
            let record = match constructor {
                Some(constructor) => self.construct(constructor, array, row, &columns, argument)?,
                None => self.populate(array, row, &columns, argument)?,
            };
            records.push(Value::Record(record));
        }
        Ok(Sequence::new(records))
    }

    /// Build a record through a positional constructor
    ///
    /// Every property must be bound to a column.
    fn construct(
        &self,
        constructor: &Constructor,
        array: &CellArray,
        row: usize,
        columns: &[Option<usize>],
        argument: usize,
    ) -> Result<RecordValue> {
        let mut args = Vec::with_capacity(self.properties.len());
        for (property, column) in self.properties.iter().zip(columns) {
            let value = match column {
                Some(col) => read_cell(array, row, *col, property),
                None => Err(Error::UnboundColumn(property.name().to_string())),
            };
            args.push(value.map_err(|e| record_build(argument, row, property.name(), e))?);
        }
        self.record_type
            .construct(constructor, args)
            .map_err(|e| record_build(argument, row, CONSTRUCTOR, e))
    }

    /// Default-construct a record and set every bound property
    ///
    /// Unbound properties keep their default.
    fn populate(
        &self,
        array: &CellArray,
        row: usize,
        columns: &[Option<usize>],
        argument: usize,
    ) -> Result<RecordValue> {
        let mut record = self
            .record_type
            .construct_default()
            .map_err(|e| record_build(argument, row, CONSTRUCTOR, e))?;

        for (property, column) in self.properties.iter().zip(columns) {
            let Some(col) = column else { continue };
            read_cell(array, row, *col, property)
                .and_then(|value| property.set(&mut record, value))
                .map_err(|e| record_build(argument, row, property.name(), e))?;
        }
        Ok(record)
    }

    /// Write a returned sequence of records out as a cell array
    fn materialise(&self, result: Value) -> Result<CellArray> {
        let records = result
            .into_sequence()?
            .map(|value| match value {
                Value::Record(record) => Ok(record),
                other => Err(Error::argument_type(self.record_type.name(), other.type_name())),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut output = CellArray::new(records.len() + 1, self.properties.len());
        for (col, property) in self.properties.iter().enumerate() {
            output.set(0, col, property.name())?;
        }
        for (i, record) in records.iter().enumerate() {
            for (col, property) in self.properties.iter().enumerate() {
                output.set(i + 1, col, property.get(record)?)?;
            }
        }
        Ok(output)
    }
}

fn read_cell(
    array: &CellArray,
    row: usize,
    col: usize,
    property: &PropertyDescriptor,
) -> Result<Value> {
    let value = match array.get(row, col) {
        Some(cell) => coerce(cell, property.value_type()),
        None => coerce(&CellValue::Empty, property.value_type()),
    };
    Ok(value?)
}

fn record_build(argument: usize, row: usize, property: &str, source: Error) -> Error {
    Error::RecordBuild {
        argument,
        row,
        property: property.to_string(),
        source: Box::new(source),
    }
}

fn invoke_target(target: &Callable, args: Vec<Value>) -> Result<Value> {
    target
        .invoke(args)
        .map_err(|e| Error::TargetInvocation {
            source: Box::new(e),
        })
}

/// Adapter from one cell array to a cell array, around a function from a
/// sequence of records to a sequence of records
#[derive(Debug, Clone)]
pub struct ArrayShim1To1 {
    target: Callable,
    input: RecordSchema,
    output: RecordSchema,
}

impl ArrayShim1To1 {
    /// Call the wrapped function
    ///
    /// Row 0 of `input` is the header row. The returned array has the output
    /// record's property names as its header row.
    pub fn call(&self, input: &CellArray) -> Result<CellArray> {
        let records = self.input.hydrate(input, 0)?;
        let result = invoke_target(&self.target, vec![Value::Sequence(records)])?;
        self.output.materialise(result)
    }

    /// The wrapped function
    pub fn target(&self) -> &Callable {
        &self.target
    }

    /// Adapt into a callable taking and returning cell arrays
    pub fn into_callable(self) -> Callable {
        let name = self.target.name().to_string();
        let parameters = array_parameters(&self.target);
        Callable::new(name, parameters, ValueType::CellArray, move |args| {
            let mut args = args.into_iter();
            let input = args.next().unwrap_or(Value::Empty).into_array()?;
            self.call(&input).map(Value::Array)
        })
    }
}

/// Adapter from two cell arrays to a cell array, around a function from two
/// sequences of records to a sequence of records
#[derive(Debug, Clone)]
pub struct ArrayShim2To1 {
    target: Callable,
    first: RecordSchema,
    second: RecordSchema,
    output: RecordSchema,
}

impl ArrayShim2To1 {
    /// Call the wrapped function
    pub fn call(&self, first: &CellArray, second: &CellArray) -> Result<CellArray> {
        let first = self.first.hydrate(first, 0)?;
        let second = self.second.hydrate(second, 1)?;
        let result = invoke_target(
            &self.target,
            vec![Value::Sequence(first), Value::Sequence(second)],
        )?;
        self.output.materialise(result)
    }

    pub fn target(&self) -> &Callable {
        &self.target
    }

    /// Adapt into a callable taking and returning cell arrays
    pub fn into_callable(self) -> Callable {
        let name = self.target.name().to_string();
        let parameters = array_parameters(&self.target);
        Callable::new(name, parameters, ValueType::CellArray, move |args| {
            let mut args = args.into_iter();
            let first = args.next().unwrap_or(Value::Empty).into_array()?;
            let second = args.next().unwrap_or(Value::Empty).into_array()?;
            self.call(&first, &second).map(Value::Array)
        })
    }
}

fn array_parameters(target: &Callable) -> Vec<Parameter> {
    target
        .parameters()
        .iter()
        .map(|p| Parameter::new(p.name.clone(), ValueType::CellArray))
        .collect()
}

fn check_arity(target: &Callable, expected: usize) -> Result<()> {
    let actual = target.parameter_count();
    if actual != expected {
        return Err(Error::Arity { expected, actual });
    }
    Ok(())
}

/// Build a shim around a function from one sequence of records to a
/// sequence of records
///
/// # Errors
///
/// [`Error::Arity`] if `target` does not take exactly one parameter, or any
/// reflection error for the parameter or return type.
pub fn make_array_shim_1to1(target: &Callable) -> Result<ArrayShim1To1> {
    check_arity(target, 1)?;
    let input = RecordSchema::reflect(&target.parameters()[0].value_type)?;
    let output = RecordSchema::reflect(target.return_type())?;

    tracing::debug!(
        function = %target.name(),
        input = %input.record_type.name(),
        output = %output.record_type.name(),
        "built 1-to-1 array shim"
    );
    Ok(ArrayShim1To1 {
        target: target.clone(),
        input,
        output,
    })
}

/// Build a shim around a function from two sequences of records to a
/// sequence of records
///
/// # Errors
///
/// [`Error::Arity`] if `target` does not take exactly two parameters, or any
/// reflection error for the parameter or return types.
pub fn make_array_shim_2to1(target: &Callable) -> Result<ArrayShim2To1> {
    check_arity(target, 2)?;
    let first = RecordSchema::reflect(&target.parameters()[0].value_type)?;
    let second = RecordSchema::reflect(&target.parameters()[1].value_type)?;
    let output = RecordSchema::reflect(target.return_type())?;

    tracing::debug!(
        function = %target.name(),
        first = %first.record_type.name(),
        second = %second.record_type.name(),
        output = %output.record_type.name(),
        "built 2-to-1 array shim"
    );
    Ok(ArrayShim2To1 {
        target: target.clone(),
        first,
        second,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use xlmap_core::{Record, RecordBuilder};

    /// Built through its positional constructor
    #[derive(Debug, Clone, PartialEq)]
    struct Fixed {
        x: f64,
        y: f64,
    }

    impl Record for Fixed {
        fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
            builder
                .read_only("X", |r| r.x)
                .read_only("Y", |r| r.y)
                .constructor(|(x, y): (f64, f64)| Fixed { x, y })
        }
    }

    /// Built through property setters
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Open {
        x: f64,
        y: f64,
    }

    impl Record for Open {
        fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
            builder
                .property("X", |r| r.x, |r, v| r.x = v)
                .property("Y", |r| r.y, |r, v| r.y = v)
                .with_default()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Sum {
        total: f64,
    }

    impl Record for Sum {
        fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
            builder
                .property("Total", |r| r.total, |r, v| r.total = v)
                .with_default()
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Dated {
        when: chrono::NaiveDateTime,
    }

    impl Record for Dated {
        fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
            builder
                .property("When", |r| r.when, |r, v| r.when = v)
                .with_default()
        }
    }

    fn array(rows: Vec<Vec<CellValue>>) -> CellArray {
        CellArray::from_rows(rows).unwrap()
    }

    fn points() -> CellArray {
        array(vec![
            vec!["x".into(), "Y".into()],
            vec![1.0.into(), 2.0.into()],
            vec![3.0.into(), 4.0.into()],
        ])
    }

    fn sum_fixed() -> Callable {
        Callable::map_records("SumFixed", |input: Vec<Fixed>| {
            input
                .into_iter()
                .map(|p| Sum { total: p.x + p.y })
                .collect::<Vec<_>>()
        })
    }

    fn sum_open() -> Callable {
        Callable::map_records("SumOpen", |input: Vec<Open>| {
            input
                .into_iter()
                .map(|p| Sum { total: p.x + p.y })
                .collect::<Vec<_>>()
        })
    }

    #[test]
    fn test_constructor_path() {
        let shim = make_array_shim_1to1(&sum_fixed()).unwrap();
        let out = shim.call(&points()).unwrap();
        assert_eq!(
            out,
            array(vec![
                vec!["Total".into()],
                vec![3.0.into()],
                vec![7.0.into()],
            ])
        );
    }

    #[test]
    fn test_setter_path_matches_constructor_path() {
        let by_ctor = make_array_shim_1to1(&sum_fixed()).unwrap().call(&points());
        let by_setter = make_array_shim_1to1(&sum_open()).unwrap().call(&points());
        assert_eq!(by_ctor.unwrap(), by_setter.unwrap());
    }

    #[test]
    fn test_unbound_column_on_constructor_path_fails() {
        let shim = make_array_shim_1to1(&sum_fixed()).unwrap();
        let input = array(vec![vec!["X".into()], vec![1.0.into()]]);
        let err = shim.call(&input).unwrap_err();
        match err {
            Error::RecordBuild {
                argument,
                row,
                property,
                source,
            } => {
                assert_eq!((argument, row, property.as_str()), (0, 1, "Y"));
                assert!(matches!(*source, Error::UnboundColumn(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unbound_column_on_setter_path_keeps_default() {
        let shim = make_array_shim_1to1(&sum_open()).unwrap();
        let input = array(vec![
            vec!["Y".into(), "Other".into()],
            vec![5.0.into(), "ignored".into()],
        ]);
        let out = shim.call(&input).unwrap();
        assert_eq!(out.get(1, 0), Some(&CellValue::Number(5.0)));
    }

    #[test]
    fn test_first_matching_header_wins() {
        let shim = make_array_shim_1to1(&sum_open()).unwrap();
        let input = array(vec![
            vec![1.0.into(), "X".into(), "x".into(), "Y".into()],
            vec![100.0.into(), 1.0.into(), 50.0.into(), 2.0.into()],
        ]);
        let out = shim.call(&input).unwrap();
        assert_eq!(out.get(1, 0), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_header_only_input_yields_header_only_output() {
        let shim = make_array_shim_1to1(&sum_open()).unwrap();
        let input = array(vec![vec!["X".into(), "Y".into()]]);
        let out = shim.call(&input).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.header(), Some(&[CellValue::from("Total")][..]));
    }

    #[test]
    fn test_empty_input() {
        let shim = make_array_shim_1to1(&sum_open()).unwrap();
        assert!(matches!(
            shim.call(&CellArray::new(0, 0)),
            Err(Error::EmptyInput { argument: 0 })
        ));
    }

    #[test]
    fn test_serial_date_column() {
        let identity = Callable::map_records("Dates", |input: Vec<Dated>| input);
        let shim = make_array_shim_1to1(&identity).unwrap();
        let out = shim
            .call(&array(vec![vec!["when".into()], vec![41910.0.into()]]))
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2014, 9, 28)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(out.get(1, 0), Some(&CellValue::DateTime(expected)));
    }

    #[test]
    fn test_non_numeric_date_cell_fails() {
        let identity = Callable::map_records("Dates", |input: Vec<Dated>| input);
        let shim = make_array_shim_1to1(&identity).unwrap();
        let err = shim
            .call(&array(vec![vec!["When".into()], vec!["soon".into()]]))
            .unwrap_err();
        match err {
            Error::RecordBuild { source, property, .. } => {
                assert_eq!(property, "When");
                assert!(matches!(*source, Error::Conversion(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_target_failure_is_wrapped() {
        let failing = Callable::try_map_records("Fail", |_: Vec<Open>| {
            Err::<Vec<Sum>, _>("boom")
        });
        let shim = make_array_shim_1to1(&failing).unwrap();
        let err = shim.call(&points()).unwrap_err();
        assert!(matches!(err, Error::TargetInvocation { .. }));
        assert_eq!(std::error::Error::source(&err).unwrap().to_string(), "boom");
    }

    #[test]
    fn test_arity_checks() {
        assert!(matches!(
            make_array_shim_2to1(&sum_open()),
            Err(Error::Arity { expected: 2, actual: 1 })
        ));
        let zip = Callable::zip_records("Zip", |a: Vec<Open>, _: Vec<Open>| a);
        assert!(matches!(
            make_array_shim_1to1(&zip),
            Err(Error::Arity { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_two_to_one() {
        let concat = Callable::zip_records("Concat", |a: Vec<Open>, b: Vec<Fixed>| {
            a.into_iter()
                .map(|p| Sum { total: p.x })
                .chain(b.into_iter().map(|p| Sum { total: p.y }))
                .collect::<Vec<_>>()
        });
        let shim = make_array_shim_2to1(&concat).unwrap();
        let out = shim.call(&points(), &points()).unwrap();
        let totals: Vec<_> = (1..out.row_count())
            .map(|r| out.get(r, 0).and_then(CellValue::as_number).unwrap())
            .collect();
        assert_eq!(totals, vec![1.0, 3.0, 2.0, 4.0]);

        assert!(matches!(
            shim.call(&CellArray::new(0, 2), &points()),
            Err(Error::EmptyInput { argument: 0 })
        ));
        assert!(matches!(
            shim.call(&points(), &CellArray::new(0, 2)),
            Err(Error::EmptyInput { argument: 1 })
        ));
    }

    #[test]
    fn test_into_callable() {
        let callable = make_array_shim_1to1(&sum_open()).unwrap().into_callable();
        assert_eq!(callable.name(), "SumOpen");
        assert_eq!(callable.parameters()[0].value_type, ValueType::CellArray);
        assert_eq!(callable.return_type(), &ValueType::CellArray);

        let out = callable
            .invoke(vec![Value::Array(points())])
            .unwrap()
            .into_array()
            .unwrap();
        assert_eq!(out.row_count(), 3);
    }
}
