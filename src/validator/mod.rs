//! Validation engine
//!
//! `ModelValidator` exposes one raw method per check, each returning
//! `(outcome, evidence)`, and a `validate_*` counterpart that lifts the raw
//! result into a [`ResultRecord`] via [`wrap_as_result`].
//!
//! Checks never mutate the dataset context. Predictions come from the bound
//! model's cache and metric names are resolved fresh on every call.

mod functional;
mod importance;
mod performance;

use crate::{
    config::ValidatorConfig,
    context::{BoundModel, DatasetContext, ModelContext},
    error::Result,
    estimator::{BaselineFitter, DummyBaselineFitter},
    result::{wrap_as_result, CheckKind, ResultRecord},
    scorer::{CustomScorers, Scorer, ScorerResolver},
    types::{ModelType, Severity, Subset},
};
use std::collections::HashMap;
use std::sync::Arc;

/// Runs named checks against a dataset/model pair
pub struct ModelValidator {
    model: BoundModel,
    custom_scorers: CustomScorers,
    baseline_fitter: Arc<dyn BaselineFitter>,
    config: ValidatorConfig,
}

impl ModelValidator {
    /// Create a validator with default configuration and no custom scorers
    #[must_use]
    pub fn new(data: DatasetContext, model: ModelContext) -> Self {
        Self::from_shared(Arc::new(data), Arc::new(model))
    }

    /// Create a validator over contexts that are shared with other owners
    #[must_use]
    pub fn from_shared(data: Arc<DatasetContext>, model: Arc<ModelContext>) -> Self {
        Self {
            model: BoundModel::new(data, model),
            custom_scorers: CustomScorers::default(),
            baseline_fitter: Arc::new(DummyBaselineFitter),
            config: ValidatorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_custom_scorers(mut self, scorers: CustomScorers) -> Self {
        self.custom_scorers = scorers;
        self
    }

    #[must_use]
    pub fn with_baseline_fitter<B: BaselineFitter + 'static>(mut self, fitter: B) -> Self {
        self.baseline_fitter = Arc::new(fitter);
        self
    }

    /// Replace the engine configuration after validating it
    pub fn with_config(mut self, config: ValidatorConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    #[must_use]
    pub fn bound_model(&self) -> &BoundModel {
        &self.model
    }

    #[must_use]
    pub fn model_type(&self) -> ModelType {
        self.model.model_type()
    }

    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    #[must_use]
    pub fn custom_scorers(&self) -> &CustomScorers {
        &self.custom_scorers
    }

    /// Mutable access to the custom scorers; later checks observe every change
    pub fn custom_scorers_mut(&mut self) -> &mut CustomScorers {
        &mut self.custom_scorers
    }

    fn scorer(&self, metric: &str) -> Result<Scorer> {
        ScorerResolver::new(Some(&self.custom_scorers)).resolve(metric)
    }

    /// Score the model with `metric` on one split
    fn score_subset(&self, metric: &str, subset: Subset) -> Result<f64> {
        let scorer = self.scorer(metric)?;
        let data = self.model.data();
        let features = data.x(subset)?;
        let target = data.y(subset)?;
        let score = scorer(self.model.estimator(), &features, target)?;
        tracing::trace!(metric, %subset, score, "Scored split");
        Ok(score)
    }

    fn severity(&self, severity: Option<Severity>) -> Option<Severity> {
        Some(severity.unwrap_or(self.config.default_severity))
    }

    /// Minimum functionality check for classifiers, as a result record
    pub fn validate_minimum_functionality(&self, severity: Option<Severity>) -> Result<ResultRecord> {
        wrap_as_result(
            CheckKind::MinimumFunctionality.as_str(),
            self.severity(severity),
            self.minimum_functionality(),
        )
    }

    /// Minimum functionality check for regressors, as a result record
    pub fn validate_minimum_functionality_in_range(
        &self,
        range_value: f64,
        range_inclusive: bool,
        severity: Option<Severity>,
    ) -> Result<ResultRecord> {
        wrap_as_result(
            CheckKind::MinimumFunctionalityInRange.as_str(),
            self.severity(severity),
            self.minimum_functionality_in_range(range_value, range_inclusive),
        )
    }

    pub fn validate_performance_against_threshold(
        &self,
        metric: &str,
        threshold: f64,
        severity: Option<Severity>,
    ) -> Result<ResultRecord> {
        wrap_as_result(
            CheckKind::PerformanceAgainstThreshold.as_str(),
            self.severity(severity),
            self.performance_against_threshold(metric, threshold),
        )
    }

    pub fn validate_biased_performance_across_category(
        &self,
        metric: &str,
        category: &str,
        threshold: f64,
        severity: Option<Severity>,
    ) -> Result<ResultRecord> {
        wrap_as_result(
            CheckKind::BiasedPerformanceAcrossCategory.as_str(),
            self.severity(severity),
            self.biased_performance_across_category(metric, category, threshold),
        )
    }

    /// Dummy baseline comparison; `strategy` defaults to the configured one
    pub fn validate_performance_against_dummy(
        &self,
        metric: &str,
        strategy: Option<&str>,
        severity: Option<Severity>,
    ) -> Result<ResultRecord> {
        let strategy = strategy.unwrap_or(&self.config.default_dummy_strategy);
        wrap_as_result(
            CheckKind::PerformanceAgainstDummy.as_str(),
            self.severity(severity),
            self.performance_against_dummy(metric, strategy),
        )
    }

    pub fn validate_performance_between_train_and_test(
        &self,
        metric: &str,
        threshold: f64,
        severity: Option<Severity>,
    ) -> Result<ResultRecord> {
        wrap_as_result(
            CheckKind::PerformanceBetweenTrainAndTest.as_str(),
            self.severity(severity),
            self.performance_between_train_and_test(metric, threshold),
        )
    }

    pub fn validate_feature_in_top_n_important_features(
        &self,
        feature: &str,
        feature_importance: &HashMap<String, f64>,
        top_n_features: usize,
        severity: Option<Severity>,
    ) -> Result<ResultRecord> {
        wrap_as_result(
            CheckKind::FeatureInTopNImportantFeatures.as_str(),
            self.severity(severity),
            Self::feature_in_top_n_important_features(feature, feature_importance, top_n_features),
        )
    }
}

impl std::fmt::Debug for ModelValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelValidator")
            .field("model", &self.model)
            .field("custom_scorers", &self.custom_scorers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
