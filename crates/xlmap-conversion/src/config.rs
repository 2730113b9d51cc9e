//! Conversion configuration builder

use crate::adaptation::Adaptation;
use crate::rule::{ParameterConversion, ReturnConversion};
use xlmap_core::{Field, ParameterRegistration, ReturnRegistration, ValueType};

/// Ordered parameter and return conversion rules
///
/// Built by value; rules keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct ParameterConversionConfiguration {
    parameter_conversions: Vec<ParameterConversion>,
    return_conversions: Vec<ReturnConversion>,
}

impl ParameterConversionConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter rule, optionally restricted to one declared type
    pub fn add_parameter_conversion<F>(mut self, rule: F, type_filter: Option<ValueType>) -> Self
    where
        F: Fn(&ValueType, &ParameterRegistration) -> Option<Adaptation> + Send + Sync + 'static,
    {
        self.parameter_conversions
            .push(ParameterConversion::new(rule, type_filter));
        self
    }

    /// Add a parameter rule for parameters declared as `ty`
    pub fn add_parameter_conversion_for<F>(self, ty: ValueType, rule: F) -> Self
    where
        F: Fn(&ValueType, &ParameterRegistration) -> Option<Adaptation> + Send + Sync + 'static,
    {
        self.add_parameter_conversion(rule, Some(ty))
    }

    /// Accept `A` from the host for parameters declared as `B`
    pub fn add_parameter_conversion_fn<A, B, F>(self, convert: F) -> Self
    where
        A: Field,
        B: Field,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let adaptation = Adaptation::typed(convert);
        self.add_parameter_conversion_for(B::value_type(), move |_, _| Some(adaptation.clone()))
    }

    /// Add a return rule, optionally restricted to one declared type
    pub fn add_return_conversion<F>(mut self, rule: F, type_filter: Option<ValueType>) -> Self
    where
        F: Fn(&ValueType, &ReturnRegistration) -> Option<Adaptation> + Send + Sync + 'static,
    {
        self.return_conversions
            .push(ReturnConversion::new(rule, type_filter));
        self
    }

    /// Add a return rule for functions declared to return `ty`
    pub fn add_return_conversion_for<F>(self, ty: ValueType, rule: F) -> Self
    where
        F: Fn(&ValueType, &ReturnRegistration) -> Option<Adaptation> + Send + Sync + 'static,
    {
        self.add_return_conversion(rule, Some(ty))
    }

    /// Hand `B` to the host for functions declared to return `A`
    pub fn add_return_conversion_fn<A, B, F>(self, convert: F) -> Self
    where
        A: Field,
        B: Field,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let adaptation = Adaptation::typed(convert);
        self.add_return_conversion_for(A::value_type(), move |_, _| Some(adaptation.clone()))
    }

    /// Parameter rules, in insertion order
    pub fn parameter_conversions(&self) -> &[ParameterConversion] {
        &self.parameter_conversions
    }

    /// Return rules, in insertion order
    pub fn return_conversions(&self) -> &[ReturnConversion] {
        &self.return_conversions
    }

    /// First adaptation offered for a parameter declared as `ty`
    pub fn first_parameter_conversion(
        &self,
        ty: &ValueType,
        registration: &ParameterRegistration,
    ) -> Option<Adaptation> {
        let found = self
            .parameter_conversions
            .iter()
            .find_map(|c| c.try_convert(ty, registration));
        if let Some(adaptation) = &found {
            tracing::trace!(
                parameter = %registration.attributes.name,
                from = %adaptation.from_type(),
                to = %adaptation.to_type(),
                "parameter conversion applies"
            );
        }
        found
    }

    /// First adaptation offered for a return value declared as `ty`
    pub fn first_return_conversion(
        &self,
        ty: &ValueType,
        registration: &ReturnRegistration,
    ) -> Option<Adaptation> {
        self.return_conversions
            .iter()
            .find_map(|c| c.try_convert(ty, registration))
    }
}
