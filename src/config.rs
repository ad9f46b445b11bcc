//! Configuration types for the validation engine

use crate::error::{Result, ValidationError};
use crate::types::Severity;
use crate::utils::NumericValidator;
use serde::{Deserialize, Serialize};

/// Engine-wide settings shared by every check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Largest number of distinct category values accepted by bias checks
    pub max_category_cardinality: usize,

    /// Smallest number of distinct category values accepted by bias checks
    pub min_category_cardinality: usize,

    /// Severity attached to results when the caller does not pass one
    pub default_severity: Severity,

    /// Baseline strategy used when a dummy comparison names none
    pub default_dummy_strategy: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_category_cardinality: 20,
            min_category_cardinality: 2,
            default_severity: Severity::Info,
            default_dummy_strategy: "most_frequent".to_string(),
        }
    }
}

impl ValidatorConfig {
    #[must_use]
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Minimum cardinality of zero, or above the maximum
    /// - Empty default dummy strategy
    pub fn validate(&self) -> Result<()> {
        if self.min_category_cardinality == 0 {
            return Err(ValidationError::argument_value_error(
                "min_category_cardinality",
                self.min_category_cardinality,
                ">= 1",
            ));
        }

        NumericValidator::validate_range(
            self.min_category_cardinality,
            1,
            self.max_category_cardinality,
            "min_category_cardinality",
        )?;

        if self.default_dummy_strategy.trim().is_empty() {
            return Err(ValidationError::invalid_argument(
                "default_dummy_strategy must not be empty",
            ));
        }

        Ok(())
    }
}

/// Builder for `ValidatorConfig`
#[derive(Debug, Default)]
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    #[must_use]
    pub fn max_category_cardinality(mut self, max: usize) -> Self {
        self.config.max_category_cardinality = max;
        self
    }

    #[must_use]
    pub fn min_category_cardinality(mut self, min: usize) -> Self {
        self.config.min_category_cardinality = min;
        self
    }

    #[must_use]
    pub fn default_severity(mut self, severity: Severity) -> Self {
        self.config.default_severity = severity;
        self
    }

    #[must_use]
    pub fn default_dummy_strategy<S: Into<String>>(mut self, strategy: S) -> Self {
        self.config.default_dummy_strategy = strategy.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ValidatorConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}
