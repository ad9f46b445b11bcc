//! Scorer capability and metric-name resolution

use crate::{
    error::{Result, ValidationError},
    estimator::Estimator,
    metrics::{MetricCatalog, MetricFn},
    types::Table,
};
use ndarray::ArrayView1;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Callable computing a numeric score for an estimator on `(features, target)`
pub type Scorer =
    Arc<dyn Fn(&dyn Estimator, &Table, ArrayView1<'_, Value>) -> Result<f64> + Send + Sync>;

fn make_scorer<F>(f: F) -> Scorer
where
    F: Fn(&dyn Estimator, &Table, ArrayView1<'_, Value>) -> Result<f64> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Lift a `(y_true, y_pred)` metric into a scorer that predicts first
#[must_use]
pub fn scorer_from_metric(metric: MetricFn) -> Scorer {
    make_scorer(move |estimator, features, target| {
        if !estimator.capabilities().predict {
            return Err(ValidationError::unsupported_estimator(
                estimator.name(),
                "predict",
            ));
        }
        let predictions = estimator.predict(features)?;
        metric(target, predictions.view())
    })
}

/// Caller-supplied scorers keyed by metric name
#[derive(Clone, Default)]
pub struct CustomScorers {
    scorers: HashMap<String, Scorer>,
}

impl CustomScorers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scorer under `name`, replacing any previous one
    pub fn insert<S, F>(&mut self, name: S, scorer: F)
    where
        S: Into<String>,
        F: Fn(&dyn Estimator, &Table, ArrayView1<'_, Value>) -> Result<f64> + Send + Sync + 'static,
    {
        self.scorers.insert(name.into(), make_scorer(scorer));
    }

    /// Builder-style variant of [`CustomScorers::insert`]
    #[must_use]
    pub fn with<S, F>(mut self, name: S, scorer: F) -> Self
    where
        S: Into<String>,
        F: Fn(&dyn Estimator, &Table, ArrayView1<'_, Value>) -> Result<f64> + Send + Sync + 'static,
    {
        self.insert(name, scorer);
        self
    }

    /// Register a `(y_true, y_pred)` metric as a scorer
    pub fn insert_metric<S: Into<String>>(&mut self, name: S, metric: MetricFn) {
        self.scorers.insert(name.into(), scorer_from_metric(metric));
    }

    pub fn remove(&mut self, name: &str) -> Option<Scorer> {
        self.scorers.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Scorer> {
        self.scorers.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scorers.contains_key(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scorers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }
}

impl std::fmt::Debug for CustomScorers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomScorers")
            .field("names", &self.names())
            .finish()
    }
}

/// Two-source resolver: built-in metric catalog first, then custom scorers
///
/// Holds no state of its own; build one per lookup so that changes to the
/// custom scorers are always observed.
#[derive(Debug, Clone, Copy)]
pub struct ScorerResolver<'a> {
    custom: Option<&'a CustomScorers>,
}

impl<'a> ScorerResolver<'a> {
    #[must_use]
    pub fn new(custom: Option<&'a CustomScorers>) -> Self {
        Self { custom }
    }

    /// Resolve `metric` to a scorer
    ///
    /// # Errors
    /// - `UnknownMetric` when neither source defines the name
    pub fn resolve(&self, metric: &str) -> Result<Scorer> {
        if let Some(f) = MetricCatalog::get(metric) {
            tracing::trace!(metric, source = "catalog", "Resolved scorer");
            return Ok(scorer_from_metric(f));
        }

        if let Some(scorer) = self.custom.and_then(|c| c.get(metric)) {
            tracing::trace!(metric, source = "custom", "Resolved scorer");
            return Ok(scorer);
        }

        Err(ValidationError::unknown_metric(metric))
    }
}
