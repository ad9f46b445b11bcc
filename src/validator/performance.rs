//! Performance checks: absolute threshold, per-category bias, dummy baseline and train/test gap

use super::ModelValidator;
use crate::{
    error::{Result, ValidationError},
    types::{evidence_from, label_key, RawOutcome, Subset},
    utils::NumericValidator,
};
use ndarray::Axis;
use serde_json::json;
use std::collections::HashMap;
use tracing::instrument;

impl ModelValidator {
    /// Validates that the test set score beats `threshold`
    ///
    /// Evidence: `performance`. The comparison is strict.
    #[instrument(level = "debug", skip(self))]
    pub fn performance_against_threshold(&self, metric: &str, threshold: f64) -> Result<RawOutcome> {
        NumericValidator::validate_finite(threshold, "threshold")?;
        let performance = self.score_subset(metric, Subset::Test)?;

        Ok((
            performance > threshold,
            evidence_from([("performance", json!(performance))]),
        ))
    }

    /// Validates that performance does not vary too much across the values of `category`
    ///
    /// The test set is partitioned by the distinct non-null values of the
    /// category column, in order of first appearance, and each partition is
    /// scored independently. The outcome holds when the spread between the
    /// best and worst partition is strictly below `threshold`.
    ///
    /// # Errors
    /// - `UnknownMetric` for an unresolvable metric
    /// - `UnknownColumn` when `category` is not a testing data column
    /// - `Cardinality` when the number of distinct values is outside the configured bounds
    /// - `Scoring` when any partition scores NaN or infinity
    #[instrument(level = "debug", skip(self))]
    pub fn biased_performance_across_category(
        &self,
        metric: &str,
        category: &str,
        threshold: f64,
    ) -> Result<RawOutcome> {
        NumericValidator::validate_finite(threshold, "threshold")?;
        let scorer = self.scorer(metric)?;
        let data = self.model.data();
        let testing = data.testing_data();
        let position = testing.require_column(category, "testing data")?;
        let values = testing.values();

        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        let mut lookup: HashMap<String, usize> = HashMap::new();
        for (row, value) in values.column(position).iter().enumerate() {
            if value.is_null() {
                continue;
            }
            let key = label_key(value);
            match lookup.get(&key) {
                Some(&group) => {
                    if let Some((_, rows)) = groups.get_mut(group) {
                        rows.push(row);
                    }
                },
                None => {
                    lookup.insert(key.clone(), groups.len());
                    groups.push((key, vec![row]));
                },
            }
        }

        let min = self.config.min_category_cardinality;
        let max = self.config.max_category_cardinality;
        if groups.len() < min || groups.len() > max {
            return Err(ValidationError::cardinality(category, groups.len(), min, max));
        }

        let x_test = data.x_test()?;
        let y_test = data.y_test()?;
        let mut scores = Vec::with_capacity(groups.len());
        for (value, rows) in &groups {
            let features = x_test.select_rows(rows);
            let target = y_test.select(Axis(0), rows);
            let score = scorer(self.model.estimator(), &features, target.view())?;
            tracing::trace!(category, value = %value, rows = rows.len(), score, "Scored category value");
            if !score.is_finite() {
                return Err(ValidationError::scoring(format!(
                    "{} score for {} = {} is not finite: {}",
                    metric, category, value, score
                )));
            }
            scores.push(score);
        }

        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max_performance_difference = best - worst;

        Ok((
            max_performance_difference < threshold,
            evidence_from([("max_performance_difference", json!(max_performance_difference))]),
        ))
    }

    /// Validates that the model beats a trivial baseline fitted on the training data
    ///
    /// Evidence: `dummy_performance` and `test_performance`. The comparison is strict,
    /// so a model that only ties the baseline fails.
    ///
    /// # Errors
    /// - `Configuration` when no training data was supplied
    /// - `InvalidArgument` for a strategy the baseline fitter does not support
    #[instrument(level = "debug", skip(self))]
    pub fn performance_against_dummy(&self, metric: &str, strategy: &str) -> Result<RawOutcome> {
        let scorer = self.scorer(metric)?;
        let data = self.model.data();
        if data.training_data().is_none() {
            return Err(ValidationError::configuration(
                "Specify training_data attribute in the DatasetContext to compare against a dummy baseline",
            ));
        }

        let dummy = self.baseline_fitter.fit(
            strategy,
            self.model.model_type(),
            &data.x_train()?,
            data.y_train()?,
        )?;

        let x_test = data.x_test()?;
        let y_test = data.y_test()?;
        let dummy_performance = scorer(dummy.as_ref(), &x_test, y_test)?;
        let test_performance = scorer(self.model.estimator(), &x_test, y_test)?;

        Ok((
            test_performance > dummy_performance,
            evidence_from([
                ("dummy_performance", json!(dummy_performance)),
                ("test_performance", json!(test_performance)),
            ]),
        ))
    }

    /// Validates that the test score does not fall more than `threshold` below the train score
    ///
    /// Holds only when the test score is strictly below the train score and
    /// within `threshold` of it. A test score at or above the train score
    /// therefore does not pass.
    ///
    /// # Errors
    /// - `MissingData` when no training data was supplied
    #[instrument(level = "debug", skip(self))]
    pub fn performance_between_train_and_test(
        &self,
        metric: &str,
        threshold: f64,
    ) -> Result<RawOutcome> {
        NumericValidator::validate_finite(threshold, "threshold")?;
        let train_score = self.score_subset(metric, Subset::Train)?;
        let test_score = self.score_subset(metric, Subset::Test)?;

        let outcome = test_score < train_score && test_score >= train_score - threshold;
        Ok((
            outcome,
            evidence_from([
                ("train_score", json!(train_score)),
                ("test_score", json!(test_score)),
            ]),
        ))
    }
}
