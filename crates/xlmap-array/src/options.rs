//! Post-processing options

/// Options for shimming array-mapped registrations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapArrayOptions {
    /// Prepended to the return type's field list in the function description
    pub function_description_prefix: String,
    /// Prepended to each parameter type's field list in its description
    pub parameter_description_prefix: String,
}

impl Default for MapArrayOptions {
    fn default() -> Self {
        Self {
            function_description_prefix: "Returns an array, with header row containing:\n".into(),
            parameter_description_prefix: "Input array, with header row containing:\n".into(),
        }
    }
}

impl MapArrayOptions {
    pub fn with_function_description_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.function_description_prefix = prefix.into();
        self
    }

    pub fn with_parameter_description_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.parameter_description_prefix = prefix.into();
        self
    }
}
