//! Registration post-processing
//!
//! Replaces the callable of every array-mapped registration with an array
//! shim and fills in descriptions listing the expected header rows. A
//! registration that cannot be shimmed is logged and passed through as-is.

use crate::options::MapArrayOptions;
use crate::reflect::describe_record_fields;
use crate::shim::{make_array_shim_1to1, make_array_shim_2to1};
use xlmap_core::{Callable, Error, FunctionRegistration, Result};

/// A shim and descriptions ready to be applied to a registration
#[derive(Debug, Clone)]
pub struct ShimmedRegistration {
    callable: Callable,
    function_description: String,
    parameter_descriptions: Vec<String>,
}

impl ShimmedRegistration {
    /// The cell-array callable
    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    pub fn function_description(&self) -> &str {
        &self.function_description
    }

    /// One description per parameter, in order
    pub fn parameter_descriptions(&self) -> &[String] {
        &self.parameter_descriptions
    }

    /// Install the shim on `registration`
    ///
    /// Descriptions are only filled in where the registration has none.
    pub fn apply(self, registration: &mut FunctionRegistration) {
        registration.callable = self.callable;

        let attributes = &mut registration.function_attributes;
        if attributes.description.is_empty() {
            attributes.description = self.function_description;
        }

        for (parameter, description) in registration
            .parameter_registrations
            .iter_mut()
            .zip(self.parameter_descriptions)
        {
            if parameter.attributes.description.is_empty() {
                parameter.attributes.description = description;
            }
        }
    }
}

/// Build the shim and descriptions for an array-mapped registration
///
/// Does not look at the registration's array-mapping marker.
///
/// # Errors
///
/// - [`Error::UnsupportedArity`] for anything but one or two parameters
/// - any error from building the shim or describing the record types
/// - [`Error::CountMismatch`] when the registration does not have one
///   parameter registration per parameter
pub fn try_shim(
    registration: &FunctionRegistration,
    options: &MapArrayOptions,
) -> Result<ShimmedRegistration> {
    let target = &registration.callable;

    let callable = match target.parameter_count() {
        1 => make_array_shim_1to1(target)?.into_callable(),
        2 => make_array_shim_2to1(target)?.into_callable(),
        n => return Err(Error::UnsupportedArity(n)),
    };

    let function_description = format!(
        "{}{}",
        options.function_description_prefix,
        describe_record_fields(target.return_type())?
    );

    let parameter_descriptions = target
        .parameters()
        .iter()
        .map(|p| {
            describe_record_fields(&p.value_type)
                .map(|fields| format!("{}{}", options.parameter_description_prefix, fields))
        })
        .collect::<Result<Vec<_>>>()?;

    let registrations = registration.parameter_registrations.len();
    if parameter_descriptions.len() != registrations {
        return Err(Error::CountMismatch {
            descriptions: parameter_descriptions.len(),
            registrations,
        });
    }

    Ok(ShimmedRegistration {
        callable,
        function_description,
        parameter_descriptions,
    })
}

fn process_one(
    mut registration: FunctionRegistration,
    options: &MapArrayOptions,
) -> FunctionRegistration {
    if !registration.is_array_mapped() {
        return registration;
    }

    match try_shim(&registration, options) {
        Ok(shimmed) => {
            shimmed.apply(&mut registration);
            tracing::debug!(
                function = %registration.function_attributes.name,
                "registered array-mapped function"
            );
        }
        Err(error) => {
            tracing::warn!(
                function = %registration.function_attributes.name,
                %error,
                "array mapping failed, keeping original registration"
            );
        }
    }
    registration
}

/// Iterator returned by [`process_map_array_functions`] and friends
#[derive(Debug, Clone)]
pub struct MapArrayFunctions<I> {
    registrations: I,
    options: MapArrayOptions,
}

impl<I> Iterator for MapArrayFunctions<I>
where
    I: Iterator<Item = FunctionRegistration>,
{
    type Item = FunctionRegistration;

    fn next(&mut self) -> Option<FunctionRegistration> {
        let registration = self.registrations.next()?;
        Some(process_one(registration, &self.options))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.registrations.size_hint()
    }
}

/// Shim every array-mapped registration, with default options
///
/// Lazy: one output per input, in the same order.
pub fn process_map_array_functions<I>(registrations: I) -> MapArrayFunctions<I::IntoIter>
where
    I: IntoIterator<Item = FunctionRegistration>,
{
    process_map_array_functions_with(registrations, &MapArrayOptions::default())
}

/// Shim every array-mapped registration, with the given options
pub fn process_map_array_functions_with<I>(
    registrations: I,
    options: &MapArrayOptions,
) -> MapArrayFunctions<I::IntoIter>
where
    I: IntoIterator<Item = FunctionRegistration>,
{
    MapArrayFunctions {
        registrations: registrations.into_iter(),
        options: options.clone(),
    }
}

/// Extension trait to post-process registrations in an iterator chain
///
/// ```rust,ignore
/// use xlmap_array::MapArrayFunctionsExt;
///
/// let registrations: Vec<_> = discovered
///     .into_iter()
///     .process_map_array_functions()
///     .collect();
/// ```
pub trait MapArrayFunctionsExt: Iterator<Item = FunctionRegistration> + Sized {
    fn process_map_array_functions(self) -> MapArrayFunctions<Self> {
        process_map_array_functions(self)
    }

    fn process_map_array_functions_with(self, options: &MapArrayOptions) -> MapArrayFunctions<Self> {
        process_map_array_functions_with(self, options)
    }
}

impl<I: Iterator<Item = FunctionRegistration>> MapArrayFunctionsExt for I {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xlmap_core::{Parameter, Record, RecordBuilder, Value, ValueType};

    #[derive(Debug, Default, Clone)]
    struct In {
        a: f64,
        b: String,
    }

    impl Record for In {
        fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
            builder
                .property("A", |r| r.a, |r, v| r.a = v)
                .property("B", |r| r.b.clone(), |r, v| r.b = v)
                .with_default()
        }
    }

    #[derive(Debug, Default, Clone)]
    struct Out {
        c: f64,
    }

    impl Record for Out {
        fn describe(builder: RecordBuilder<Self>) -> RecordBuilder<Self> {
            builder.property("C", |r| r.c, |r, v| r.c = v).with_default()
        }
    }

    fn mapped() -> FunctionRegistration {
        let callable = Callable::map_records("Convert", |input: Vec<In>| {
            input.into_iter().map(|r| Out { c: r.a }).collect::<Vec<_>>()
        });
        FunctionRegistration::new("dnaConvert", callable).with_array_mapping()
    }

    fn zipped() -> FunctionRegistration {
        let callable = Callable::zip_records("Join", |a: Vec<In>, _: Vec<Out>| {
            a.into_iter().map(|r| Out { c: r.a }).collect::<Vec<_>>()
        });
        FunctionRegistration::new("dnaJoin", callable).with_array_mapping()
    }

    #[test]
    fn test_descriptions_use_prefixes() {
        let shimmed = try_shim(&mapped(), &MapArrayOptions::default()).unwrap();
        assert_eq!(
            shimmed.function_description(),
            "Returns an array, with header row containing:\nC"
        );
        assert_eq!(
            shimmed.parameter_descriptions(),
            &["Input array, with header row containing:\nA,B".to_string()]
        );
    }

    #[test]
    fn test_each_parameter_gets_its_own_description() {
        let options = MapArrayOptions::default()
            .with_function_description_prefix("out: ")
            .with_parameter_description_prefix("in: ");
        let shimmed = try_shim(&zipped(), &options).unwrap();
        assert_eq!(shimmed.function_description(), "out: C");
        assert_eq!(
            shimmed.parameter_descriptions(),
            &["in: A,B".to_string(), "in: C".to_string()]
        );
    }

    #[test]
    fn test_unsupported_arity() {
        let callable = Callable::new(
            "Three",
            vec![
                Parameter::new("a", ValueType::records::<In>()),
                Parameter::new("b", ValueType::records::<In>()),
                Parameter::new("c", ValueType::records::<In>()),
            ],
            ValueType::records::<Out>(),
            |_| Ok(Value::Empty),
        );
        let reg = FunctionRegistration::new("dnaThree", callable).with_array_mapping();
        assert!(matches!(
            try_shim(&reg, &MapArrayOptions::default()),
            Err(Error::UnsupportedArity(3))
        ));
    }

    #[test]
    fn test_count_mismatch() {
        let mut reg = mapped();
        reg.parameter_registrations.clear();
        assert!(matches!(
            try_shim(&reg, &MapArrayOptions::default()),
            Err(Error::CountMismatch {
                descriptions: 1,
                registrations: 0
            })
        ));
    }

    #[test]
    fn test_apply_keeps_existing_descriptions() {
        let mut reg = mapped().with_description("Converts rows");
        reg.parameter_registrations[0].attributes.description = "Rows to convert".into();

        let shimmed = try_shim(&reg, &MapArrayOptions::default()).unwrap();
        shimmed.apply(&mut reg);

        assert_eq!(reg.function_attributes.description, "Converts rows");
        assert_eq!(
            reg.parameter_registrations[0].attributes.description,
            "Rows to convert"
        );
        assert_eq!(reg.callable.return_type(), &ValueType::CellArray);
    }

    #[test]
    fn test_unflagged_passes_through() {
        let reg = mapped();
        let mut plain = reg.clone();
        plain.function_attributes.array_mapping = xlmap_core::ArrayMapping::None;
        let original = plain.callable.clone();

        let out: Vec<_> = process_map_array_functions(vec![plain]).collect();
        assert!(out[0].callable.ptr_eq(&original));
        assert!(out[0].function_attributes.description.is_empty());
    }

    #[test]
    fn test_extension_trait() {
        let out: Vec<_> = vec![mapped(), zipped()]
            .into_iter()
            .process_map_array_functions()
            .collect();
        assert_eq!(out.len(), 2);
        assert!(out
            .iter()
            .all(|r| r.callable.return_type() == &ValueType::CellArray));
    }
}
