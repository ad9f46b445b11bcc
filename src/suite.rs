//! Declarative check suites
//!
//! A suite is a named list of check invocations that can be written by hand as
//! JSON and replayed against any validator:
//!
//! ```json
//! {
//!   "name": "titanic nightly",
//!   "checks": [
//!     {"check": "performance_against_threshold", "metric": "accuracy", "threshold": 0.7, "severity": "error"},
//!     {"check": "biased_performance_across_category", "metric": "accuracy", "category": "Sex", "threshold": 0.2}
//!   ]
//! }
//! ```

use crate::{
    error::{Result, ValidationError},
    report::ValidationReport,
    result::{CheckKind, ResultRecord},
    types::Severity,
    validator::ModelValidator,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

fn default_range_inclusive() -> bool {
    true
}

/// One check invocation with its arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum CheckSpec {
    MinimumFunctionality {
        #[serde(default)]
        severity: Option<Severity>,
    },
    MinimumFunctionalityInRange {
        range_value: f64,
        #[serde(default = "default_range_inclusive")]
        range_inclusive: bool,
        #[serde(default)]
        severity: Option<Severity>,
    },
    PerformanceAgainstThreshold {
        metric: String,
        threshold: f64,
        #[serde(default)]
        severity: Option<Severity>,
    },
    BiasedPerformanceAcrossCategory {
        metric: String,
        category: String,
        threshold: f64,
        #[serde(default)]
        severity: Option<Severity>,
    },
    PerformanceAgainstDummy {
        metric: String,
        #[serde(default)]
        strategy: Option<String>,
        #[serde(default)]
        severity: Option<Severity>,
    },
    PerformanceBetweenTrainAndTest {
        metric: String,
        threshold: f64,
        #[serde(default)]
        severity: Option<Severity>,
    },
    FeatureInTopNImportantFeatures {
        feature: String,
        feature_importance: HashMap<String, f64>,
        top_n_features: usize,
        #[serde(default)]
        severity: Option<Severity>,
    },
}

impl CheckSpec {
    #[must_use]
    pub fn kind(&self) -> CheckKind {
        match self {
            Self::MinimumFunctionality { .. } => CheckKind::MinimumFunctionality,
            Self::MinimumFunctionalityInRange { .. } => CheckKind::MinimumFunctionalityInRange,
            Self::PerformanceAgainstThreshold { .. } => CheckKind::PerformanceAgainstThreshold,
            Self::BiasedPerformanceAcrossCategory { .. } => {
                CheckKind::BiasedPerformanceAcrossCategory
            },
            Self::PerformanceAgainstDummy { .. } => CheckKind::PerformanceAgainstDummy,
            Self::PerformanceBetweenTrainAndTest { .. } => {
                CheckKind::PerformanceBetweenTrainAndTest
            },
            Self::FeatureInTopNImportantFeatures { .. } => {
                CheckKind::FeatureInTopNImportantFeatures
            },
        }
    }

    /// Invoke the check on `validator`
    pub fn run(&self, validator: &ModelValidator) -> Result<ResultRecord> {
        match self {
            Self::MinimumFunctionality { severity } => {
                validator.validate_minimum_functionality(*severity)
            },
            Self::MinimumFunctionalityInRange {
                range_value,
                range_inclusive,
                severity,
            } => validator.validate_minimum_functionality_in_range(
                *range_value,
                *range_inclusive,
                *severity,
            ),
            Self::PerformanceAgainstThreshold {
                metric,
                threshold,
                severity,
            } => validator.validate_performance_against_threshold(metric, *threshold, *severity),
            Self::BiasedPerformanceAcrossCategory {
                metric,
                category,
                threshold,
                severity,
            } => validator.validate_biased_performance_across_category(
                metric, category, *threshold, *severity,
            ),
            Self::PerformanceAgainstDummy {
                metric,
                strategy,
                severity,
            } => validator.validate_performance_against_dummy(
                metric,
                strategy.as_deref(),
                *severity,
            ),
            Self::PerformanceBetweenTrainAndTest {
                metric,
                threshold,
                severity,
            } => validator.validate_performance_between_train_and_test(
                metric, *threshold, *severity,
            ),
            Self::FeatureInTopNImportantFeatures {
                feature,
                feature_importance,
                top_n_features,
                severity,
            } => validator.validate_feature_in_top_n_important_features(
                feature,
                feature_importance,
                *top_n_features,
                *severity,
            ),
        }
    }
}

/// Named, ordered list of checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSuite {
    pub name: String,
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

impl ValidationSuite {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_check(mut self, check: CheckSpec) -> Self {
        self.checks.push(check);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::file_io_error("read suite", path, &e))?;
        Self::from_json_str(&json)
    }

    /// Run every check in order, isolating failures
    pub fn run(&self, validator: &ModelValidator) -> ValidationReport {
        let _span = tracing::info_span!("suite", name = %self.name, checks = self.checks.len()).entered();
        let mut report = ValidationReport::new(self.name.clone());
        for check in &self.checks {
            report.record(check.kind().as_str(), || check.run(validator));
        }
        tracing::info!(
            passed = report.passed(),
            failed = report.failed(),
            errors = report.failures.len(),
            "Suite finished"
        );
        report
    }
}
