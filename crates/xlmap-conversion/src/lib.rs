//! # xlmap-conversion
//!
//! Declarative configuration of parameter and return value conversions.
//!
//! Rules are kept in insertion order. A consumer asks each rule in turn
//! whether it applies to a declared type; the first rule that yields an
//! [`Adaptation`] wins.
//!
//! ## Example
//!
//! ```rust
//! use xlmap_conversion::ParameterConversionConfiguration;
//! use xlmap_core::{ParameterRegistration, Value, ValueType};
//!
//! let config = ParameterConversionConfiguration::new()
//!     .add_parameter_conversion_fn(|n: f64| n.round() as i32)
//!     .add_return_conversion_fn(|n: i64| n.to_string());
//!
//! let registration = ParameterRegistration::new("count");
//! let adaptation = config
//!     .first_parameter_conversion(&ValueType::Int32, &registration)
//!     .unwrap();
//! assert_eq!(adaptation.from_type(), &ValueType::Double);
//! assert!(matches!(adaptation.apply(Value::Double(2.6)), Ok(Value::Int32(3))));
//! ```

mod adaptation;
mod config;
mod rule;

pub use adaptation::Adaptation;
pub use config::ParameterConversionConfiguration;
pub use rule::{Conversion, ParameterConversion, ReturnConversion, Rule};
