//! Minimum functionality checks
//!
//! Both checks predict on the minimum functionality split and report every
//! offending row. The rows are reported from a working copy that carries an
//! extra `predictions` column; the caller's table is never touched.

use super::ModelValidator;
use crate::{
    error::{Result, ValidationError},
    result::CheckKind,
    types::{evidence_from, labels_equal, value_as_f64, Evidence, ModelType, RawOutcome, Subset, Table},
    utils::NumericValidator,
};
use ndarray::Array1;
use serde_json::Value;
use tracing::instrument;

impl ModelValidator {
    /// Validates that a classifier predicts every minimum functionality row exactly
    ///
    /// # Errors
    /// - `EstimatorType` for regressors
    /// - `Configuration` when no (or empty) minimum functionality data was supplied
    #[instrument(level = "debug", skip(self))]
    pub fn minimum_functionality(&self) -> Result<RawOutcome> {
        self.model.ensure_model_type(
            ModelType::Classifier,
            CheckKind::MinimumFunctionalityInRange.as_str(),
        )?;
        let data = self.minimum_functionality_data()?;
        let predictions = self.model.predict(Subset::MinimumFunctionality)?;
        let target = data.column(self.model.data().target())?;

        let mismatches: Vec<usize> = target
            .iter()
            .zip(predictions.iter())
            .enumerate()
            .filter(|(_, (truth, prediction))| !labels_equal(truth, prediction))
            .map(|(i, _)| i)
            .collect();

        let outcome = Self::functional_outcome(data, &predictions, &mismatches)?;
        tracing::debug!(
            outcome = outcome.0,
            mismatches = mismatches.len(),
            "Minimum functionality check finished"
        );
        Ok(outcome)
    }

    /// Validates that every regressor prediction falls within `target ± range_value`
    ///
    /// With `range_inclusive` the bounds themselves are accepted; without it a
    /// prediction on a bound counts as a violation.
    ///
    /// # Errors
    /// - `EstimatorType` for classifiers
    /// - `Configuration` when no (or empty) minimum functionality data was supplied
    /// - `InvalidArgument` for a negative or non-finite `range_value`
    /// - `Scoring` when a target or prediction is not numeric
    #[instrument(level = "debug", skip(self))]
    pub fn minimum_functionality_in_range(
        &self,
        range_value: f64,
        range_inclusive: bool,
    ) -> Result<RawOutcome> {
        self.model.ensure_model_type(
            ModelType::Regressor,
            CheckKind::MinimumFunctionality.as_str(),
        )?;
        NumericValidator::validate_non_negative(range_value, "range_value")?;
        let data = self.minimum_functionality_data()?;
        let predictions = self.model.predict(Subset::MinimumFunctionality)?;
        let target = data.column(self.model.data().target())?;

        let mut violations = Vec::new();
        for (i, (truth, prediction)) in target.iter().zip(predictions.iter()).enumerate() {
            let truth = value_as_f64(truth, "target")?;
            let prediction = value_as_f64(prediction, "prediction")?;
            let lower = truth - range_value;
            let upper = truth + range_value;

            let in_range = if range_inclusive {
                lower <= prediction && prediction <= upper
            } else {
                lower < prediction && prediction < upper
            };
            if !in_range {
                violations.push(i);
            }
        }

        let outcome = Self::functional_outcome(data, &predictions, &violations)?;
        tracing::debug!(
            outcome = outcome.0,
            violations = violations.len(),
            "Minimum functionality in range check finished"
        );
        Ok(outcome)
    }

    fn minimum_functionality_data(&self) -> Result<&Table> {
        match self.model.data().minimum_functionality_data() {
            Some(table) if !table.is_empty() => Ok(table),
            Some(_) => Err(ValidationError::configuration(
                "minimum_functionality_data in the DatasetContext is empty",
            )),
            None => Err(ValidationError::configuration(
                "Specify minimum_functionality_data attribute in the DatasetContext",
            )),
        }
    }

    fn functional_outcome(
        data: &Table,
        predictions: &Array1<Value>,
        offending_rows: &[usize],
    ) -> Result<RawOutcome> {
        if offending_rows.is_empty() {
            return Ok((true, Evidence::new()));
        }

        let errors = data
            .with_column("predictions", predictions.view())?
            .select_rows(offending_rows);
        Ok((false, evidence_from([("errors_df", errors.to_column_dict())])))
    }
}
