#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Model Validator
//!
//! A validation engine for trained predictive models. Given a fitted estimator
//! and its dataset splits, the engine runs named checks and reports each one as
//! a structured pass/fail record with supporting evidence.
//!
//! ## Features
//!
//! - **Performance checks**: absolute thresholds, train/test gaps and dummy baselines
//! - **Bias checks**: performance spread across the values of a categorical column
//! - **Minimum functionality**: exact-match and tolerance-range sanity checks
//! - **Feature importance**: ranking of a feature among caller-supplied importances
//! - **Prediction caching**: predictions are computed at most once per split
//! - **Pluggable scoring**: built-in metric catalog plus caller-defined scorers
//! - **Suites and reports**: declarative JSON suites producing persisted reports
//!
//! ## Quick Start
//!
//! ```rust
//! use model_validator::{
//!     DatasetContext, Estimator, ModelContext, ModelType, ModelValidator, Severity, Table,
//! };
//! use ndarray::Array1;
//! use serde_json::{json, Value};
//!
//! /// Predicts survival for every passenger who paid more than 20
//! struct FareRule;
//!
//! impl Estimator for FareRule {
//!     fn predict(&self, features: &Table) -> model_validator::Result<Array1<Value>> {
//!         let fares = features.column("Fare")?;
//!         Ok(fares
//!             .iter()
//!             .map(|fare| json!(i64::from(fare.as_f64().unwrap_or(0.0) > 20.0)))
//!             .collect())
//!     }
//! }
//!
//! # fn main() -> model_validator::Result<()> {
//! let testing = Table::new(
//!     vec!["Fare", "Survived"],
//!     vec![
//!         vec![json!(50.0), json!(1)],
//!         vec![json!(8.0), json!(0)],
//!         vec![json!(30.0), json!(0)],
//!     ],
//! )?;
//! let data = DatasetContext::builder()
//!     .target("Survived")
//!     .testing_data(testing)
//!     .build()?;
//! let model = ModelContext::new(FareRule, ModelType::Classifier);
//!
//! let validator = ModelValidator::new(data, model);
//! let record =
//!     validator.validate_performance_against_threshold("accuracy", 0.5, Some(Severity::Error))?;
//! assert!(record.outcome());
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The library emits `tracing` events and spans but never installs a
//! subscriber; applications choose how to collect them.

pub mod config;
pub mod context;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod report;
pub mod result;
pub mod scorer;
pub mod suite;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
pub mod utils;
pub mod validator;

// Public API exports
pub use config::{ValidatorConfig, ValidatorConfigBuilder};
pub use context::{BoundModel, DatasetContext, DatasetContextBuilder, ModelContext};
pub use error::{Result, ValidationError};
pub use estimator::{
    BaselineFitter, DummyBaselineFitter, DummyEstimator, Estimator, EstimatorCapabilities,
    EvaluationFunction,
};
pub use metrics::{MetricCatalog, MetricFn};
pub use report::{CheckFailure, JsonFileSink, ReportSink, ValidationReport};
pub use result::{wrap_as_result, CheckKind, ResultRecord};
pub use scorer::{scorer_from_metric, CustomScorers, Scorer, ScorerResolver};
pub use suite::{CheckSpec, ValidationSuite};
pub use types::{Evidence, ModelType, RawOutcome, Severity, Subset, Table};
pub use utils::NumericValidator;
pub use validator::ModelValidator;
