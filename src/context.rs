//! Dataset and model contexts, and the bound model that joins them
//!
//! `DatasetContext` and `ModelContext` are built once by the caller and never
//! mutated afterwards. `BoundModel` pairs them behind shared handles and caches
//! predictions per dataset split.

use crate::{
    error::{Result, ValidationError},
    estimator::{Estimator, EstimatorCapabilities, EvaluationFunction},
    metrics,
    types::{labels_equal, ModelType, Subset, Table},
};
use ndarray::{Array1, Array2, ArrayView1};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// Immutable bundle of labeled data splits and column roles
#[derive(Debug, Clone)]
pub struct DatasetContext {
    target: String,
    features: Vec<String>,
    testing_data: Table,
    training_data: Option<Table>,
    minimum_functionality_data: Option<Table>,
    business_columns: HashMap<String, String>,
}

impl DatasetContext {
    #[must_use]
    pub fn builder() -> DatasetContextBuilder {
        DatasetContextBuilder::default()
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    #[must_use]
    pub fn testing_data(&self) -> &Table {
        &self.testing_data
    }

    #[must_use]
    pub fn training_data(&self) -> Option<&Table> {
        self.training_data.as_ref()
    }

    #[must_use]
    pub fn minimum_functionality_data(&self) -> Option<&Table> {
        self.minimum_functionality_data.as_ref()
    }

    /// Raw-to-business column name mapping
    #[must_use]
    pub fn business_columns(&self) -> &HashMap<String, String> {
        &self.business_columns
    }

    /// The table for `subset`, if it was supplied
    #[must_use]
    pub fn dataset(&self, subset: Subset) -> Option<&Table> {
        match subset {
            Subset::Test => Some(&self.testing_data),
            Subset::Train => self.training_data.as_ref(),
            Subset::MinimumFunctionality => self.minimum_functionality_data.as_ref(),
        }
    }

    /// The table for `subset`, failing with `MissingData` when absent
    pub fn require(&self, subset: Subset) -> Result<&Table> {
        self.dataset(subset)
            .ok_or_else(|| ValidationError::missing_data(subset))
    }

    /// Feature projection (`X`) of a split
    pub fn x(&self, subset: Subset) -> Result<Table> {
        self.require(subset)?.select_columns(&self.features)
    }

    /// Target view (`y`) of a split
    pub fn y(&self, subset: Subset) -> Result<ArrayView1<'_, Value>> {
        self.require(subset)?.column(&self.target)
    }

    pub fn x_test(&self) -> Result<Table> {
        self.x(Subset::Test)
    }

    pub fn y_test(&self) -> Result<ArrayView1<'_, Value>> {
        self.y(Subset::Test)
    }

    pub fn x_train(&self) -> Result<Table> {
        self.x(Subset::Train)
    }

    pub fn y_train(&self) -> Result<ArrayView1<'_, Value>> {
        self.y(Subset::Train)
    }

    /// Copy of the testing data with business column names applied
    #[must_use]
    pub fn renamed_testing_data(&self) -> Table {
        self.testing_data.rename_columns(&self.business_columns)
    }
}

/// Builder for `DatasetContext`
#[derive(Debug, Default)]
pub struct DatasetContextBuilder {
    target: Option<String>,
    features: Option<Vec<String>>,
    testing_data: Option<Table>,
    training_data: Option<Table>,
    minimum_functionality_data: Option<Table>,
    business_columns: HashMap<String, String>,
}

impl DatasetContextBuilder {
    #[must_use]
    pub fn target<S: Into<String>>(mut self, target: S) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Feature columns; defaults to every testing column except the target
    #[must_use]
    pub fn features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn testing_data(mut self, table: Table) -> Self {
        self.testing_data = Some(table);
        self
    }

    #[must_use]
    pub fn training_data(mut self, table: Table) -> Self {
        self.training_data = Some(table);
        self
    }

    #[must_use]
    pub fn minimum_functionality_data(mut self, table: Table) -> Self {
        self.minimum_functionality_data = Some(table);
        self
    }

    #[must_use]
    pub fn business_column<R: Into<String>, B: Into<String>>(mut self, raw: R, business: B) -> Self {
        self.business_columns.insert(raw.into(), business.into());
        self
    }

    /// Build and validate the context
    ///
    /// # Errors
    /// - No target column or no testing data
    /// - Target or a feature column missing from a supplied split
    pub fn build(self) -> Result<DatasetContext> {
        let target = self
            .target
            .ok_or_else(|| ValidationError::configuration("A target column must be specified"))?;
        let testing_data = self
            .testing_data
            .ok_or_else(|| ValidationError::missing_data(Subset::Test))?;

        let features = self.features.unwrap_or_else(|| {
            testing_data
                .columns()
                .iter()
                .filter(|c| **c != target)
                .cloned()
                .collect()
        });

        if features.iter().any(|f| *f == target) {
            return Err(ValidationError::configuration(format!(
                "Target column '{}' cannot also be a feature",
                target
            )));
        }

        let splits = [
            (Subset::Test, Some(&testing_data)),
            (Subset::Train, self.training_data.as_ref()),
            (
                Subset::MinimumFunctionality,
                self.minimum_functionality_data.as_ref(),
            ),
        ];
        for (subset, table) in splits {
            let Some(table) = table else { continue };
            let context = format!("{} data", subset);
            table.require_column(&target, &context)?;
            for feature in &features {
                table.require_column(feature, &context)?;
            }
        }

        for raw in self.business_columns.keys() {
            testing_data.require_column(raw, "testing data (business column mapping)")?;
        }

        Ok(DatasetContext {
            target,
            features,
            testing_data,
            training_data: self.training_data,
            minimum_functionality_data: self.minimum_functionality_data,
            business_columns: self.business_columns,
        })
    }
}

fn classifier_evaluation(predictions: ArrayView1<'_, Value>, y_true: ArrayView1<'_, Value>) -> Result<f64> {
    metrics::accuracy(y_true, predictions)
}

fn regressor_evaluation(predictions: ArrayView1<'_, Value>, y_true: ArrayView1<'_, Value>) -> Result<f64> {
    metrics::r2(y_true, predictions)
}

/// A fitted estimator plus its declared kind and default evaluation function
#[derive(Clone)]
pub struct ModelContext {
    estimator: Arc<dyn Estimator>,
    model_type: ModelType,
    evaluation_function: EvaluationFunction,
}

impl ModelContext {
    /// Wrap an estimator; the evaluation function defaults to accuracy for
    /// classifiers and r2 for regressors
    pub fn new<E: Estimator + 'static>(estimator: E, model_type: ModelType) -> Self {
        Self::from_shared(Arc::new(estimator), model_type)
    }

    #[must_use]
    pub fn from_shared(estimator: Arc<dyn Estimator>, model_type: ModelType) -> Self {
        let evaluation_function: EvaluationFunction = match model_type {
            ModelType::Classifier => Arc::new(classifier_evaluation),
            ModelType::Regressor => Arc::new(regressor_evaluation),
        };
        Self {
            estimator,
            model_type,
            evaluation_function,
        }
    }

    /// Replace the evaluation function, called as `f(predictions, y_true)`
    #[must_use]
    pub fn with_evaluation_function<F>(mut self, f: F) -> Self
    where
        F: Fn(ArrayView1<'_, Value>, ArrayView1<'_, Value>) -> Result<f64> + Send + Sync + 'static,
    {
        self.evaluation_function = Arc::new(f);
        self
    }

    #[must_use]
    pub fn estimator(&self) -> &dyn Estimator {
        self.estimator.as_ref()
    }

    #[must_use]
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    #[must_use]
    pub fn evaluation_function(&self) -> &EvaluationFunction {
        &self.evaluation_function
    }
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("estimator", &self.estimator.name())
            .field("model_type", &self.model_type)
            .finish_non_exhaustive()
    }
}

/// Write-once cache slot
///
/// Population is serialized through `init`, so concurrent first-time readers
/// compute the predictions exactly once. Reads after that never lock.
#[derive(Default)]
struct PredictionSlot {
    value: OnceLock<Arc<Array1<Value>>>,
    init: Mutex<()>,
}

impl PredictionSlot {
    fn get(&self) -> Option<Arc<Array1<Value>>> {
        self.value.get().cloned()
    }

    fn get_or_try_init<F>(&self, compute: F) -> Result<Arc<Array1<Value>>>
    where
        F: FnOnce() -> Result<Array1<Value>>,
    {
        if let Some(cached) = self.get() {
            return Ok(cached);
        }

        let _guard = self
            .init
            .lock()
            .map_err(|_| ValidationError::internal("prediction cache lock poisoned"))?;
        if let Some(cached) = self.get() {
            return Ok(cached);
        }

        let computed = Arc::new(compute()?);
        // Only this thread can set the slot while holding the guard.
        let _ = self.value.set(Arc::clone(&computed));
        Ok(computed)
    }
}

/// Pairing of a dataset and a model with cached predictions
pub struct BoundModel {
    data: Arc<DatasetContext>,
    model: Arc<ModelContext>,
    capabilities: EstimatorCapabilities,
    predictions_on_test: PredictionSlot,
    predictions_on_train: PredictionSlot,
    predictions_on_minimum_functionality: PredictionSlot,
}

impl BoundModel {
    /// Bind a dataset to a model, resolving the estimator's capabilities once
    #[must_use]
    pub fn new(data: Arc<DatasetContext>, model: Arc<ModelContext>) -> Self {
        let capabilities = model.estimator().capabilities();
        tracing::debug!(
            estimator = model.estimator().name(),
            model_type = %model.model_type(),
            predict = capabilities.predict,
            predict_proba = capabilities.predict_proba,
            "Bound model to dataset context"
        );

        Self {
            data,
            model,
            capabilities,
            predictions_on_test: PredictionSlot::default(),
            predictions_on_train: PredictionSlot::default(),
            predictions_on_minimum_functionality: PredictionSlot::default(),
        }
    }

    #[must_use]
    pub fn data(&self) -> &DatasetContext {
        &self.data
    }

    #[must_use]
    pub fn model(&self) -> &ModelContext {
        &self.model
    }

    #[must_use]
    pub fn estimator(&self) -> &dyn Estimator {
        self.model.estimator()
    }

    #[must_use]
    pub fn model_type(&self) -> ModelType {
        self.model.model_type()
    }

    #[must_use]
    pub fn capabilities(&self) -> EstimatorCapabilities {
        self.capabilities
    }

    fn slot(&self, subset: Subset) -> &PredictionSlot {
        match subset {
            Subset::Test => &self.predictions_on_test,
            Subset::Train => &self.predictions_on_train,
            Subset::MinimumFunctionality => &self.predictions_on_minimum_functionality,
        }
    }

    /// Whether predictions for `subset` have already been computed
    #[must_use]
    pub fn is_cached(&self, subset: Subset) -> bool {
        self.slot(subset).get().is_some()
    }

    /// Fail with `EstimatorType` unless the model is of the `expected` kind
    pub fn ensure_model_type(&self, expected: ModelType, sibling_check: &str) -> Result<()> {
        let actual = self.model_type();
        if actual == expected {
            Ok(())
        } else {
            Err(ValidationError::estimator_type(expected, actual, sibling_check))
        }
    }

    /// Cached predictions for `subset`, computed on first request
    ///
    /// # Errors
    /// - `UnsupportedEstimator` when the estimator cannot predict
    /// - `MissingData` when the split was not supplied
    /// - Estimator failures, or a prediction count that does not match the rows
    pub fn predict(&self, subset: Subset) -> Result<Arc<Array1<Value>>> {
        if !self.capabilities.predict {
            return Err(ValidationError::unsupported_estimator(
                self.estimator().name(),
                "predict",
            ));
        }
        self.slot(subset).get_or_try_init(|| {
            let features = self.data.x(subset)?;
            tracing::debug!(%subset, rows = features.n_rows(), "Computing predictions");
            let predictions = self.estimator().predict(&features)?;
            if predictions.len() != features.n_rows() {
                return Err(ValidationError::internal(format!(
                    "Estimator '{}' returned {} predictions for {} {} rows",
                    self.estimator().name(),
                    predictions.len(),
                    features.n_rows(),
                    subset
                )));
            }
            Ok(predictions)
        })
    }

    /// Class probabilities for `subset` (not cached)
    pub fn predict_proba(&self, subset: Subset) -> Result<Array2<f64>> {
        if !self.capabilities.predict_proba {
            return Err(ValidationError::unsupported_estimator(
                self.estimator().name(),
                "predict_proba",
            ));
        }
        let features = self.data.x(subset)?;
        self.estimator().predict_proba(&features)
    }

    /// Score test predictions with the model context's evaluation function
    pub fn compute_performance_on_test_set(&self) -> Result<f64> {
        let predictions = self.predict(Subset::Test)?;
        let y_test = self.data.y_test()?;
        (self.model.evaluation_function())(predictions.view(), y_test)
    }

    /// Test rows the model gets wrong, with a `<target>_predictions` column added
    ///
    /// With `business_columns` the rows are returned under their business names.
    pub fn explore_test_set_errors(&self, business_columns: bool) -> Result<Table> {
        let predictions = self.predict(Subset::Test)?;
        let y_test = self.data.y_test()?;

        let (table, target) = if business_columns {
            let target = self
                .data
                .business_columns()
                .get(self.data.target())
                .map_or_else(|| self.data.target().to_string(), Clone::clone);
            (self.data.renamed_testing_data(), target)
        } else {
            (self.data.testing_data().clone(), self.data.target().to_string())
        };

        let mismatches: Vec<usize> = y_test
            .iter()
            .zip(predictions.iter())
            .enumerate()
            .filter(|(_, (truth, prediction))| !labels_equal(truth, prediction))
            .map(|(i, _)| i)
            .collect();

        table
            .with_column(&format!("{}_predictions", target), predictions.view())
            .map(|t| t.select_rows(&mismatches))
    }
}

impl std::fmt::Debug for BoundModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundModel")
            .field("model", &self.model)
            .field("capabilities", &self.capabilities)
            .field("test_cached", &self.is_cached(Subset::Test))
            .field("train_cached", &self.is_cached(Subset::Train))
            .field(
                "minimum_functionality_cached",
                &self.is_cached(Subset::MinimumFunctionality),
            )
            .finish_non_exhaustive()
    }
}
