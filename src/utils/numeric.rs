//! Numeric validation utilities
//!
//! Argument checks applied before a check runs, so that a NaN threshold or a
//! negative range cannot silently turn into a failed outcome.

use crate::error::{Result, ValidationError};

/// Validator for numeric check arguments
pub struct NumericValidator;

impl NumericValidator {
    /// Validate that a value is finite
    pub fn validate_finite(value: f64, name: &str) -> Result<f64> {
        if !value.is_finite() {
            return Err(ValidationError::invalid_argument(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }
        Ok(value)
    }

    /// Validate that a value is finite and not negative
    pub fn validate_non_negative(value: f64, name: &str) -> Result<f64> {
        Self::validate_finite(value, name)?;
        if value < 0.0 {
            return Err(ValidationError::argument_value_error(name, value, ">= 0"));
        }
        Ok(value)
    }

    /// Validate numeric range (inclusive)
    pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> Result<T>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(ValidationError::invalid_argument(format!(
                "{} must be between {} and {}, got {}",
                name, min, max, value
            )));
        }
        Ok(value)
    }
}
