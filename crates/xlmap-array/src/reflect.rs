//! Record-type reflection over declared sequence types

use xlmap_core::{Error, PropertyDescriptor, RecordType, Result, ValueType};

/// Extract the record type of a declared "sequence of records" and its
/// directly declared properties, in declared order
///
/// # Errors
///
/// - [`Error::InvalidShape`] if `sequence_type` is not a sequence
/// - [`Error::EmptyRecord`] if the element is not a record, or declares no
///   properties of its own
pub fn reflect(sequence_type: &ValueType) -> Result<(RecordType, Vec<PropertyDescriptor>)> {
    let element = sequence_type.element_type().ok_or_else(|| Error::InvalidShape {
        ty: sequence_type.to_string(),
    })?;

    let record = element.as_record().ok_or_else(|| Error::EmptyRecord {
        record: element.to_string(),
    })?;

    let properties: Vec<_> = record.declared_properties().cloned().collect();
    if properties.is_empty() {
        return Err(Error::EmptyRecord {
            record: record.name().to_string(),
        });
    }

    Ok((record.clone(), properties))
}

/// Comma-separated property names of a declared "sequence of records"
///
/// ```rust
/// use xlmap_array::describe_record_fields;
/// use xlmap_core::{Record, RecordBuilder, ValueType};
///
/// #[derive(Default)]
/// struct Trade {
///     id: i32,
///     price: f64,
/// }
///
/// impl Record for Trade {
///     fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
///         builder
///             .property("Id", |t| t.id, |t, v| t.id = v)
///             .property("Price", |t| t.price, |t, v| t.price = v)
///             .with_default()
///     }
/// }
///
/// let help = describe_record_fields(&ValueType::records::<Trade>()).unwrap();
/// assert_eq!(help, "Id,Price");
/// ```
pub fn describe_record_fields(sequence_type: &ValueType) -> Result<String> {
    let (_, properties) = reflect(sequence_type)?;
    let names: Vec<&str> = properties.iter().map(|p| p.name()).collect();
    Ok(names.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xlmap_core::{Record, RecordBuilder};

    #[derive(Default)]
    struct Row {
        i: i32,
        s: String,
        d: f64,
    }

    impl Record for Row {
        fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
            builder
                .property("I", |r| r.i, |r, v| r.i = v)
                .property("S", |r| r.s.clone(), |r, v| r.s = v)
                .property("D", |r| r.d, |r, v| r.d = v)
                .with_default()
        }
    }

    #[derive(Default)]
    struct OnlyInherited {
        id: i64,
    }

    impl Record for OnlyInherited {
        fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
            builder.inherited("Id", |r| r.id, |r, v| r.id = v).with_default()
        }
    }

    #[test]
    fn test_reflect_sequence_of_records() {
        let (record, properties) = reflect(&ValueType::records::<Row>()).unwrap();
        assert_eq!(record.name(), "Row");
        let names: Vec<_> = properties.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["I", "S", "D"]);
    }

    #[test]
    fn test_describe_record_fields() {
        assert_eq!(
            describe_record_fields(&ValueType::records::<Row>()).unwrap(),
            "I,S,D"
        );
    }

    #[test]
    fn test_non_sequence_is_invalid_shape() {
        for ty in [
            ValueType::Double,
            ValueType::CellArray,
            ValueType::Generic {
                name: "Map".into(),
                args: vec![ValueType::String, ValueType::Double],
            },
        ] {
            assert!(matches!(reflect(&ty), Err(Error::InvalidShape { .. })), "{ty}");
        }
    }

    #[test]
    fn test_sequence_of_scalars_is_empty_record() {
        let err = reflect(&ValueType::sequence_of(ValueType::Double)).unwrap_err();
        assert!(matches!(err, Error::EmptyRecord { record } if record == "Double"));
    }

    #[test]
    fn test_only_inherited_properties_is_empty_record() {
        let err = describe_record_fields(&ValueType::records::<OnlyInherited>()).unwrap_err();
        assert!(matches!(err, Error::EmptyRecord { record } if record == "OnlyInherited"));
    }
}
