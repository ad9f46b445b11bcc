//! Test utilities and mock estimators
//!
//! Rule-based implementations of the `Estimator` trait so validations can be
//! exercised without a real model. Every mock counts its `predict` calls, which
//! lets tests verify prediction caching.
//!
//! Compiled for unit tests and behind the `test-utils` feature.

use crate::{
    error::{Result, ValidationError},
    estimator::{Estimator, EstimatorCapabilities},
    types::{labels_equal, value_as_f64, Table},
};
use ndarray::{Array1, Array2, ArrayView1};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Named read access to one row handed to a mock rule
pub struct RowRef<'a> {
    columns: &'a [String],
    values: ArrayView1<'a, Value>,
}

impl RowRef<'_> {
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Numeric value of `column`, or NaN when absent or not numeric
    #[must_use]
    pub fn number(&self, column: &str) -> f64 {
        self.get(column)
            .and_then(|v| value_as_f64(v, column).ok())
            .unwrap_or(f64::NAN)
    }
}

type Rule = Arc<dyn Fn(&RowRef<'_>) -> Value + Send + Sync>;

/// Mock estimator driven by a per-row rule
#[derive(Clone)]
pub struct MockEstimator {
    name: String,
    rule: Rule,
    capabilities: EstimatorCapabilities,
    should_fail_predict: bool,
    predict_calls: Arc<AtomicUsize>,
}

impl MockEstimator {
    /// Create a mock from an arbitrary row rule
    pub fn from_rule<S, F>(name: S, rule: F) -> Self
    where
        S: Into<String>,
        F: Fn(&RowRef<'_>) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            rule: Arc::new(rule),
            capabilities: EstimatorCapabilities::predict_only(),
            should_fail_predict: false,
            predict_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Predict the value of `column` unchanged
    #[must_use]
    pub fn echo(column: &str) -> Self {
        let column = column.to_string();
        Self::from_rule("echo", move |row| row.get(&column).cloned().unwrap_or(Value::Null))
    }

    /// Predict `above` when `column > cutoff`, `below` otherwise
    #[must_use]
    pub fn threshold(column: &str, cutoff: f64, above: Value, below: Value) -> Self {
        let column = column.to_string();
        Self::from_rule("threshold", move |row| {
            if row.number(&column) > cutoff {
                above.clone()
            } else {
                below.clone()
            }
        })
    }

    /// Predict `slope * column + intercept`
    #[must_use]
    pub fn linear(column: &str, slope: f64, intercept: f64) -> Self {
        let column = column.to_string();
        Self::from_rule("linear", move |row| {
            Value::from(slope * row.number(&column) + intercept)
        })
    }

    /// Predict the same value for every row
    #[must_use]
    pub fn constant(value: Value) -> Self {
        Self::from_rule("constant", move |_| value.clone())
    }

    /// Declare `predict_proba` support
    #[must_use]
    pub fn with_probabilities(mut self) -> Self {
        self.capabilities = EstimatorCapabilities::with_probabilities();
        self
    }

    /// Declare no point-prediction capability
    #[must_use]
    pub fn without_predict(mut self) -> Self {
        self.capabilities.predict = false;
        self
    }

    /// Make every `predict` call fail
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.should_fail_predict = true;
        self
    }

    /// Number of `predict` calls made so far, across clones
    #[must_use]
    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }
}

impl Estimator for MockEstimator {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> EstimatorCapabilities {
        self.capabilities
    }

    fn predict(&self, features: &Table) -> Result<Array1<Value>> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        if !self.capabilities.predict {
            return Err(ValidationError::unsupported_estimator(&self.name, "predict"));
        }
        if self.should_fail_predict {
            return Err(ValidationError::internal(format!(
                "mock estimator '{}' failed to predict",
                self.name
            )));
        }

        let columns = features.columns();
        Ok(features
            .values()
            .rows()
            .into_iter()
            .map(|values| (self.rule)(&RowRef { columns, values }))
            .collect())
    }

    fn predict_proba(&self, features: &Table) -> Result<Array2<f64>> {
        if !self.capabilities.predict_proba {
            return Err(ValidationError::unsupported_estimator(
                &self.name,
                "predict_proba",
            ));
        }

        let predictions = self.predict(features)?;
        let positive = Value::from(1);
        Ok(Array2::from_shape_fn((predictions.len(), 2), |(i, j)| {
            let p = predictions
                .get(i)
                .map_or(0.0, |v| if labels_equal(v, &positive) { 1.0 } else { 0.0 });
            if j == 1 {
                p
            } else {
                1.0 - p
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> Table {
        Table::new(
            vec!["Fare", "Sex"],
            vec![
                vec![json!(10.0), json!("male")],
                vec![json!(30.0), json!("female")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_threshold_rule() {
        let mock = MockEstimator::threshold("Fare", 20.0, json!(1), json!(0));
        let predictions = mock.predict(&table()).unwrap();
        assert_eq!(predictions.to_vec(), vec![json!(0), json!(1)]);
        assert_eq!(mock.predict_calls(), 1);
    }

    #[test]
    fn test_echo_and_linear() {
        let echo = MockEstimator::echo("Sex");
        assert_eq!(echo.predict(&table()).unwrap()[1], json!("female"));

        let linear = MockEstimator::linear("Fare", 2.0, 1.0);
        assert_eq!(linear.predict(&table()).unwrap()[0], json!(21.0));
    }

    #[test]
    fn test_call_counter_shared_across_clones() {
        let mock = MockEstimator::constant(json!(0));
        let clone = mock.clone();
        clone.predict(&table()).unwrap();
        assert_eq!(mock.predict_calls(), 1);
    }

    #[test]
    fn test_probabilities() {
        let mock = MockEstimator::threshold("Fare", 20.0, json!(1), json!(0));
        assert!(mock.predict_proba(&table()).is_err());

        let mock = mock.with_probabilities();
        let proba = mock.predict_proba(&table()).unwrap();
        assert_eq!(proba.shape(), &[2, 2]);
        assert_eq!(proba[[1, 1]], 1.0);
        assert_eq!(proba[[0, 0]], 1.0);
    }

    #[test]
    fn test_failure_modes() {
        let failing = MockEstimator::constant(json!(0)).failing();
        assert!(matches!(
            failing.predict(&table()),
            Err(ValidationError::Internal(_))
        ));

        let no_predict = MockEstimator::constant(json!(0)).without_predict();
        assert!(matches!(
            no_predict.predict(&table()),
            Err(ValidationError::UnsupportedEstimator { .. })
        ));
    }
}
