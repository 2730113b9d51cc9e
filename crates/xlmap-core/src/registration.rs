//! Function registrations
//!
//! A [`FunctionRegistration`] is the mutable descriptor of a candidate
//! worksheet function: the callable plus the attribute blocks the host shows
//! in its function wizard.

use crate::callable::Callable;

/// How a function's array arguments are mapped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayMapping {
    /// Registered as-is
    #[default]
    None,
    /// Record sequences are exposed as cell arrays with a header row
    MapArray,
}

/// Attributes of the function itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionAttributes {
    pub name: String,
    pub description: String,
    pub category: String,
    pub array_mapping: ArrayMapping,
}

/// Attributes of one argument
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentAttributes {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterRegistration {
    pub attributes: ArgumentAttributes,
}

impl ParameterRegistration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            attributes: ArgumentAttributes {
                name: name.into(),
                description: String::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnRegistration {
    /// Free-form tags used by return conversions
    pub tags: Vec<String>,
}

/// A candidate worksheet function
#[derive(Debug, Clone)]
pub struct FunctionRegistration {
    pub callable: Callable,
    pub function_attributes: FunctionAttributes,
    pub parameter_registrations: Vec<ParameterRegistration>,
    pub return_registration: ReturnRegistration,
}

impl FunctionRegistration {
    /// Register `callable` under `name`, with one parameter registration per
    /// parameter and empty descriptions
    pub fn new(name: impl Into<String>, callable: Callable) -> Self {
        let parameter_registrations = callable
            .parameters()
            .iter()
            .map(|p| ParameterRegistration::new(p.name.clone()))
            .collect();
        Self {
            callable,
            function_attributes: FunctionAttributes {
                name: name.into(),
                ..Default::default()
            },
            parameter_registrations,
            return_registration: ReturnRegistration::default(),
        }
    }

    /// Mark the function for array mapping
    pub fn with_array_mapping(mut self) -> Self {
        self.function_attributes.array_mapping = ArrayMapping::MapArray;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.function_attributes.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.function_attributes.category = category.into();
        self
    }

    pub fn is_array_mapped(&self) -> bool {
        self.function_attributes.array_mapping == ArrayMapping::MapArray
    }
}
