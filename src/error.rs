//! Error types for model validation operations

use crate::types::{ModelType, Subset};
use thiserror::Error;

/// Result type alias for model validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Error taxonomy for validation checks and the data model they run on
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A context field that a check depends on was not supplied
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A dataset split was requested but never supplied
    #[error("Missing data: no {subset} data was supplied in the dataset context")]
    MissingData { subset: Subset },

    /// Check invoked against the wrong model kind
    #[error(
        "Estimator type error: validation may only be applied to {expected} model types, got {actual}. {suggestion}"
    )]
    EstimatorType {
        expected: ModelType,
        actual: ModelType,
        suggestion: String,
    },

    /// A named column does not exist where it is referenced
    #[error("Unknown column: '{column}' not found in {context}")]
    UnknownColumn { column: String, context: String },

    /// Category has too few or too many distinct non-null values
    #[error(
        "Cardinality error: category '{category}' has {count} distinct values (allowed range: {min}-{max})"
    )]
    Cardinality {
        category: String,
        count: usize,
        min: usize,
        max: usize,
    },

    /// Metric name found neither in the built-in catalog nor in the custom scorers
    #[error(
        "Unknown metric: '{metric}' is not part of the built-in metric catalog, nor is it defined in the custom scorers"
    )]
    UnknownMetric { metric: String },

    /// Estimator lacks a capability that the operation requires
    #[error("Unsupported estimator: '{estimator}' has no {capability}() capability")]
    UnsupportedEstimator {
        estimator: String,
        capability: String,
    },

    /// Invalid argument passed to a check or constructor
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A metric could not be computed over the given data
    #[error("Scoring error: {0}")]
    Scoring(String),

    /// Input/output errors from report sinks
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ValidationError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new missing data error for a dataset split
    #[must_use]
    pub fn missing_data(subset: Subset) -> Self {
        Self::MissingData { subset }
    }

    /// Create a model kind mismatch error, pointing at the sibling check
    pub fn estimator_type<S: AsRef<str>>(
        expected: ModelType,
        actual: ModelType,
        sibling_check: S,
    ) -> Self {
        Self::EstimatorType {
            expected,
            actual,
            suggestion: format!(
                "Try '{}' validation for {} model types.",
                sibling_check.as_ref(),
                actual
            ),
        }
    }

    /// Create an unknown column error with the place that was searched
    pub fn unknown_column<C: Into<String>, S: Into<String>>(column: C, context: S) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            context: context.into(),
        }
    }

    /// Create a cardinality error
    pub fn cardinality<S: Into<String>>(category: S, count: usize, min: usize, max: usize) -> Self {
        Self::Cardinality {
            category: category.into(),
            count,
            min,
            max,
        }
    }

    /// Create an unknown metric error
    pub fn unknown_metric<S: Into<String>>(metric: S) -> Self {
        Self::UnknownMetric {
            metric: metric.into(),
        }
    }

    /// Create an unsupported estimator error
    pub fn unsupported_estimator<E: Into<String>, C: Into<String>>(
        estimator: E,
        capability: C,
    ) -> Self {
        Self::UnsupportedEstimator {
            estimator: estimator.into(),
            capability: capability.into(),
        }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new scoring error
    pub fn scoring<S: Into<String>>(msg: S) -> Self {
        Self::Scoring(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an invalid argument error describing the accepted values
    pub fn argument_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidArgument(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }
}
