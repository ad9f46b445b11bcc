//! Estimator capability abstraction and trivial baseline predictors

use crate::{
    error::{Result, ValidationError},
    types::{compare_labels, label_key, value_as_f64, ModelType, Table},
};
use ndarray::{Array1, Array2, ArrayView1};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Capabilities an estimator declares up front
///
/// Resolved once when a [`crate::BoundModel`] is built, so checks can fail early
/// with `UnsupportedEstimator` instead of deep inside a scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorCapabilities {
    pub predict: bool,
    pub predict_proba: bool,
}

impl EstimatorCapabilities {
    /// Point predictions only
    #[must_use]
    pub fn predict_only() -> Self {
        Self {
            predict: true,
            predict_proba: false,
        }
    }

    /// Point predictions and class probabilities
    #[must_use]
    pub fn with_probabilities() -> Self {
        Self {
            predict: true,
            predict_proba: true,
        }
    }
}

impl Default for EstimatorCapabilities {
    fn default() -> Self {
        Self::predict_only()
    }
}

/// Trait for fitted predictive models
pub trait Estimator: Send + Sync {
    /// Human-readable estimator name used in error messages
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Capabilities this estimator supports
    fn capabilities(&self) -> EstimatorCapabilities {
        EstimatorCapabilities::predict_only()
    }

    /// Predict one label or value per row of `features`
    ///
    /// # Errors
    /// - Estimator-specific prediction failures
    /// - `UnsupportedEstimator` when point prediction is not available
    fn predict(&self, features: &Table) -> Result<Array1<Value>>;

    /// Predict one probability distribution per row of `features`
    ///
    /// # Errors
    /// - `UnsupportedEstimator` unless overridden
    fn predict_proba(&self, _features: &Table) -> Result<Array2<f64>> {
        Err(ValidationError::unsupported_estimator(
            self.name(),
            "predict_proba",
        ))
    }
}

/// Metric applied as `(predictions, y_true) -> score` for generic performance reporting
pub type EvaluationFunction =
    Arc<dyn Fn(ArrayView1<'_, Value>, ArrayView1<'_, Value>) -> Result<f64> + Send + Sync>;

/// Capability that fits a trivial baseline predictor on training data
pub trait BaselineFitter: Send + Sync {
    /// Fit a baseline using the named `strategy`
    ///
    /// # Errors
    /// - Unsupported strategy for the given model kind
    /// - Training data that the strategy cannot summarise
    fn fit(
        &self,
        strategy: &str,
        model_type: ModelType,
        features: &Table,
        target: ArrayView1<'_, Value>,
    ) -> Result<Box<dyn Estimator>>;
}

/// Built-in baseline fitter producing constant predictors
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyBaselineFitter;

impl DummyBaselineFitter {
    pub const CLASSIFIER_STRATEGIES: [&'static str; 2] = ["most_frequent", "prior"];
    pub const REGRESSOR_STRATEGIES: [&'static str; 3] = ["mean", "median", "most_frequent"];

    /// Most frequent label; ties resolve to the smallest label
    fn most_frequent(target: ArrayView1<'_, Value>) -> Option<Value> {
        let mut counts: HashMap<String, (usize, &Value)> = HashMap::new();
        for value in target.iter().filter(|v| !v.is_null()) {
            counts.entry(label_key(value)).or_insert((0, value)).0 += 1;
        }

        counts
            .into_values()
            .max_by(|(count_a, a), (count_b, b)| {
                count_a.cmp(count_b).then_with(|| compare_labels(b, a))
            })
            .map(|(_, value)| value.clone())
    }

    fn numeric_target(target: ArrayView1<'_, Value>) -> Result<Vec<f64>> {
        target
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| value_as_f64(v, "training target"))
            .collect()
    }

    fn mean(values: &[f64]) -> Option<f64> {
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    }

    fn median(mut values: Vec<f64>) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        let upper = *values.get(mid)?;
        if values.len() % 2 == 0 {
            let lower = *values.get(mid.checked_sub(1)?)?;
            Some((lower + upper) / 2.0)
        } else {
            Some(upper)
        }
    }
}

impl BaselineFitter for DummyBaselineFitter {
    fn fit(
        &self,
        strategy: &str,
        model_type: ModelType,
        _features: &Table,
        target: ArrayView1<'_, Value>,
    ) -> Result<Box<dyn Estimator>> {
        let supported: &[&str] = match model_type {
            ModelType::Classifier => &Self::CLASSIFIER_STRATEGIES,
            ModelType::Regressor => &Self::REGRESSOR_STRATEGIES,
        };
        if !supported.contains(&strategy) {
            return Err(ValidationError::invalid_argument(format!(
                "Unknown baseline strategy '{}' for {} models. Supported strategies: {}",
                strategy,
                model_type,
                supported.join(", ")
            )));
        }

        let prediction = match strategy {
            "most_frequent" | "prior" => Self::most_frequent(target),
            "mean" => Self::mean(&Self::numeric_target(target)?).map(Value::from),
            "median" => Self::median(Self::numeric_target(target)?).map(Value::from),
            _ => None,
        }
        .ok_or_else(|| {
            ValidationError::invalid_argument(format!(
                "Cannot fit '{}' baseline on an empty training target",
                strategy
            ))
        })?;

        tracing::debug!(strategy, prediction = %prediction, "Fitted dummy baseline");
        Ok(Box::new(DummyEstimator {
            strategy: strategy.to_string(),
            prediction,
        }))
    }
}

/// Baseline predictor that returns the same value for every row
#[derive(Debug, Clone, PartialEq)]
pub struct DummyEstimator {
    strategy: String,
    prediction: Value,
}

impl DummyEstimator {
    #[must_use]
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    #[must_use]
    pub fn prediction(&self) -> &Value {
        &self.prediction
    }
}

impl Estimator for DummyEstimator {
    fn name(&self) -> &str {
        "DummyEstimator"
    }

    fn predict(&self, features: &Table) -> Result<Array1<Value>> {
        Ok(Array1::from_elem(features.n_rows(), self.prediction.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_features(rows: usize) -> Table {
        Table::new(Vec::<String>::new(), vec![Vec::new(); rows]).unwrap()
    }

    #[test]
    fn test_most_frequent_baseline() {
        let target = Array1::from(vec![json!(0), json!(1), json!(0), json!(0), json!(1)]);
        let baseline = DummyBaselineFitter
            .fit("most_frequent", ModelType::Classifier, &empty_features(5), target.view())
            .unwrap();

        let predictions = baseline.predict(&empty_features(3)).unwrap();
        assert_eq!(predictions.len(), 3);
        assert!(predictions.iter().all(|p| *p == json!(0)));
    }

    #[test]
    fn test_most_frequent_tie_picks_smallest_label() {
        let target = Array1::from(vec![json!(1), json!(0), json!(1), json!(0)]);
        let baseline = DummyBaselineFitter
            .fit("prior", ModelType::Classifier, &empty_features(4), target.view())
            .unwrap();
        assert_eq!(baseline.predict(&empty_features(1)).unwrap()[0], json!(0));
    }

    #[test]
    fn test_mean_and_median_baselines() {
        let target = Array1::from(vec![json!(1.0), json!(2.0), json!(9.0)]);
        let mean = DummyBaselineFitter
            .fit("mean", ModelType::Regressor, &empty_features(3), target.view())
            .unwrap();
        assert_eq!(mean.predict(&empty_features(1)).unwrap()[0], json!(4.0));

        let median = DummyBaselineFitter
            .fit("median", ModelType::Regressor, &empty_features(3), target.view())
            .unwrap();
        assert_eq!(median.predict(&empty_features(1)).unwrap()[0], json!(2.0));
    }

    #[test]
    fn test_median_of_even_length_target() {
        let target = Array1::from(vec![json!(4.0), json!(1.0), json!(3.0), json!(2.0)]);
        let median = DummyBaselineFitter
            .fit("median", ModelType::Regressor, &empty_features(4), target.view())
            .unwrap();
        assert_eq!(median.predict(&empty_features(1)).unwrap()[0], json!(2.5));
    }

    #[test]
    fn test_unknown_strategy_lists_supported() {
        let target = Array1::from(vec![json!(1)]);
        let err = DummyBaselineFitter
            .fit("mean", ModelType::Classifier, &empty_features(1), target.view())
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.contains("'mean'"));
        assert!(message.contains("most_frequent, prior"));
    }

    #[test]
    fn test_empty_target_fails() {
        let target: Array1<Value> = Array1::from(Vec::new());
        let result =
            DummyBaselineFitter.fit("most_frequent", ModelType::Classifier, &empty_features(0), target.view());
        assert!(matches!(result, Err(ValidationError::InvalidArgument(_))));
    }

    #[test]
    fn test_default_predict_proba_is_unsupported() {
        let dummy = DummyEstimator {
            strategy: "prior".to_string(),
            prediction: json!(1),
        };
        let err = dummy.predict_proba(&empty_features(1)).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedEstimator { .. }));
        assert!(err.to_string().contains("predict_proba"));
    }
}
