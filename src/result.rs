//! Structured result records and the envelope that produces them

use crate::error::Result;
use crate::types::{Evidence, RawOutcome, Severity};
use serde::{Deserialize, Serialize};

/// Identifier of each check the engine exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    MinimumFunctionality,
    MinimumFunctionalityInRange,
    PerformanceAgainstThreshold,
    BiasedPerformanceAcrossCategory,
    PerformanceAgainstDummy,
    PerformanceBetweenTrainAndTest,
    FeatureInTopNImportantFeatures,
}

impl CheckKind {
    pub const ALL: [CheckKind; 7] = [
        Self::MinimumFunctionality,
        Self::MinimumFunctionalityInRange,
        Self::PerformanceAgainstThreshold,
        Self::BiasedPerformanceAcrossCategory,
        Self::PerformanceAgainstDummy,
        Self::PerformanceBetweenTrainAndTest,
        Self::FeatureInTopNImportantFeatures,
    ];

    /// Check name recorded in results
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MinimumFunctionality => "validate_minimum_functionality",
            Self::MinimumFunctionalityInRange => "validate_minimum_functionality_in_range",
            Self::PerformanceAgainstThreshold => "validate_performance_against_threshold",
            Self::BiasedPerformanceAcrossCategory => {
                "validate_biased_performance_across_category"
            },
            Self::PerformanceAgainstDummy => "validate_performance_against_dummy",
            Self::PerformanceBetweenTrainAndTest => "validate_performance_between_train_and_test",
            Self::FeatureInTopNImportantFeatures => "validate_feature_in_top_n_important_features",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auditable outcome of one check invocation
///
/// Immutable once created; serializes as `check_name`, `outcome`, `evidence`, `severity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    check_name: String,
    outcome: bool,
    evidence: Evidence,
    #[serde(default)]
    severity: Severity,
}

impl ResultRecord {
    #[must_use]
    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    #[must_use]
    pub fn outcome(&self) -> bool {
        self.outcome
    }

    #[must_use]
    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

/// Lift a check's raw result into a record
///
/// Errors raised by the check pass through untouched.
pub fn wrap_as_result(
    check_name: &str,
    severity: Option<Severity>,
    raw: Result<RawOutcome>,
) -> Result<ResultRecord> {
    let (outcome, evidence) = raw?;
    let record = ResultRecord {
        check_name: check_name.to_string(),
        outcome,
        evidence,
        severity: severity.unwrap_or_default(),
    };
    tracing::debug!(
        check = %record.check_name,
        outcome = record.outcome,
        severity = %record.severity,
        "Recorded check result"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::evidence_from;
    use serde_json::json;

    #[test]
    fn test_wrap_success() {
        let raw = Ok((false, evidence_from([("performance", json!(0.5))])));
        let record = wrap_as_result(
            CheckKind::PerformanceAgainstThreshold.as_str(),
            Some(Severity::Error),
            raw,
        )
        .unwrap();

        assert_eq!(record.check_name(), "validate_performance_against_threshold");
        assert!(!record.outcome());
        assert_eq!(record.evidence()["performance"], json!(0.5));
        assert_eq!(record.severity(), Severity::Error);
    }

    #[test]
    fn test_wrap_default_severity() {
        let record = wrap_as_result("custom", None, Ok((true, Evidence::new()))).unwrap();
        assert_eq!(record.severity(), Severity::Info);
    }

    #[test]
    fn test_wrap_passes_errors_through() {
        let raw = Err(ValidationError::unknown_metric("nope"));
        let err = wrap_as_result("custom", None, raw).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownMetric { .. }));
    }

    #[test]
    fn test_record_wire_shape() {
        let record = wrap_as_result(
            CheckKind::FeatureInTopNImportantFeatures.as_str(),
            Some(Severity::Warning),
            Ok((true, evidence_from([("feature_importance_ranking", json!(1))]))),
        )
        .unwrap();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "check_name": "validate_feature_in_top_n_important_features",
                "outcome": true,
                "evidence": {"feature_importance_ranking": 1},
                "severity": "warning"
            })
        );

        let decoded: ResultRecord = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_check_names_unique() {
        let mut names: Vec<&str> = CheckKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CheckKind::ALL.len());
        assert_eq!(
            serde_json::to_string(&CheckKind::PerformanceAgainstDummy).unwrap(),
            "\"performance_against_dummy\""
        );
    }
}
