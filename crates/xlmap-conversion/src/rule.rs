//! Type-filtered conversion rules

use crate::adaptation::Adaptation;
use std::fmt;
use std::sync::Arc;
use xlmap_core::{Error, ParameterRegistration, Result, ReturnRegistration, ValueType};

/// Rule body: given a declared type and its registration, maybe produce an
/// adaptation
pub type Rule<R> = Arc<dyn Fn(&ValueType, &R) -> Option<Adaptation> + Send + Sync>;

/// A rule with an optional type filter
///
/// When a filter is set, the rule body only sees that exact type.
pub struct Conversion<R> {
    type_filter: Option<ValueType>,
    rule: Rule<R>,
}

/// Conversion applied to a parameter of a registered function
pub type ParameterConversion = Conversion<ParameterRegistration>;

/// Conversion applied to the return value of a registered function
pub type ReturnConversion = Conversion<ReturnRegistration>;

impl<R> Conversion<R> {
    pub fn new<F>(rule: F, type_filter: Option<ValueType>) -> Self
    where
        F: Fn(&ValueType, &R) -> Option<Adaptation> + Send + Sync + 'static,
    {
        Self {
            type_filter,
            rule: Arc::new(rule),
        }
    }

    /// Create a conversion from an optional rule body
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `rule` is `None`.
    pub fn try_new(rule: Option<Rule<R>>, type_filter: Option<ValueType>) -> Result<Self> {
        let rule = rule.ok_or_else(|| Error::InvalidArgument("conversion rule is missing".into()))?;
        Ok(Self { type_filter, rule })
    }

    pub fn type_filter(&self) -> Option<&ValueType> {
        self.type_filter.as_ref()
    }

    /// Ask the rule for an adaptation of `ty`
    ///
    /// Returns `None` without running the rule body when a filter is set and
    /// differs from `ty`.
    pub fn try_convert(&self, ty: &ValueType, registration: &R) -> Option<Adaptation> {
        match &self.type_filter {
            Some(filter) if filter != ty => None,
            _ => (self.rule)(ty, registration),
        }
    }
}

impl<R> Clone for Conversion<R> {
    fn clone(&self) -> Self {
        Self {
            type_filter: self.type_filter.clone(),
            rule: Arc::clone(&self.rule),
        }
    }
}

impl<R> fmt::Debug for Conversion<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversion")
            .field("type_filter", &self.type_filter)
            .finish_non_exhaustive()
    }
}
