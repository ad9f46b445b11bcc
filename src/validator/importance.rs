use super::ModelValidator;
use crate::{
    error::{Result, ValidationError},
    types::{evidence_from, RawOutcome},
    utils::NumericValidator,
};
use serde_json::json;
use std::collections::HashMap;
use tracing::instrument;

impl ModelValidator {
    /// Validates that `feature` ranks within the `top_n_features` most important features
    ///
    /// The ranking is the number of features with a strictly greater importance,
    /// so ties share the better rank. Evidence: `feature_importance_ranking`.
    ///
    /// # Errors
    /// - `UnknownColumn` when `feature` is not in the importance mapping
    /// - `InvalidArgument` when the feature's own importance is not finite
    #[instrument(level = "debug", skip(feature_importance))]
    pub fn feature_in_top_n_important_features(
        feature: &str,
        feature_importance: &HashMap<String, f64>,
        top_n_features: usize,
    ) -> Result<RawOutcome> {
        let importance = feature_importance
            .get(feature)
            .copied()
            .ok_or_else(|| ValidationError::unknown_column(feature, "feature importance mapping"))?;
        NumericValidator::validate_finite(importance, &format!("importance of '{}'", feature))?;

        let nan_count = feature_importance.values().filter(|v| v.is_nan()).count();
        if nan_count > 0 {
            tracing::warn!(
                count = nan_count,
                "Ignoring NaN feature importances when ranking"
            );
        }

        let ranking = feature_importance
            .values()
            .filter(|&&other| other > importance)
            .count();
        tracing::debug!(feature, ranking, top_n_features, "Ranked feature importance");

        Ok((
            ranking < top_n_features,
            evidence_from([("feature_importance_ranking", json!(ranking))]),
        ))
    }
}
