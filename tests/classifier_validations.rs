//! Classification checks against the Titanic-like fixture

mod common;

use common::{approx_eq, fare_rule, titanic_context, titanic_validator, titanic_validator_with};
use model_validator::{
    test_utils::MockEstimator, CustomScorers, DatasetContext, ModelContext, ModelType,
    ModelValidator, Result, Severity, Subset, Table,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

#[test]
fn test_performance_below_threshold_fails() -> Result<()> {
    let validator = titanic_validator();
    let (outcome, evidence) = validator.performance_against_threshold("accuracy", 0.7)?;

    assert!(!outcome);
    assert_eq!(evidence.len(), 1);
    assert_eq!(evidence["performance"], json!(0.5));

    let record =
        validator.validate_performance_against_threshold("accuracy", 0.7, Some(Severity::Error))?;
    assert_eq!(record.check_name(), "validate_performance_against_threshold");
    assert!(!record.outcome());
    assert_eq!(record.severity(), Severity::Error);
    Ok(())
}

#[test]
fn test_bias_across_sex() -> Result<()> {
    let validator = titanic_validator();
    let (outcome, evidence) = validator.biased_performance_across_category("accuracy", "Sex", 0.2)?;

    assert!(!outcome);
    let spread = evidence["max_performance_difference"].as_f64().unwrap();
    assert!(approx_eq(spread, 0.6), "spread was {}", spread);

    let (outcome, _) = validator.biased_performance_across_category("accuracy", "Sex", 0.7)?;
    assert!(outcome);
    Ok(())
}

#[test]
fn test_feature_in_top_n() -> Result<()> {
    let importance: HashMap<String, f64> = [("Age", 0.5), ("Sex", 0.8), ("Fare", 0.3)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    let record = titanic_validator().validate_feature_in_top_n_important_features(
        "Age",
        &importance,
        2,
        None,
    )?;
    assert!(record.outcome());
    assert_eq!(record.evidence()["feature_importance_ranking"], json!(1));
    assert_eq!(record.severity(), Severity::Info);
    Ok(())
}

#[test]
fn test_dummy_baseline_beats_model() -> Result<()> {
    let validator = titanic_validator();
    let (outcome, evidence) = validator.performance_against_dummy("accuracy", "most_frequent")?;

    assert!(!outcome);
    assert!(approx_eq(evidence["dummy_performance"].as_f64().unwrap(), 0.6));
    assert_eq!(evidence["test_performance"], json!(0.5));

    // The configured default strategy is used when none is named.
    let record = validator.validate_performance_against_dummy("accuracy", None, None)?;
    assert_eq!(record.evidence(), &evidence);
    Ok(())
}

#[test]
fn test_train_test_gap() -> Result<()> {
    let validator = titanic_validator();

    let (outcome, evidence) = validator.performance_between_train_and_test("accuracy", 0.2)?;
    assert!(outcome);
    assert!(approx_eq(evidence["train_score"].as_f64().unwrap(), 4.0 / 6.0));
    assert_eq!(evidence["test_score"], json!(0.5));

    let (outcome, _) = validator.performance_between_train_and_test("accuracy", 0.1)?;
    assert!(!outcome);
    Ok(())
}

#[test]
fn test_minimum_functionality_passes() -> Result<()> {
    let record = titanic_validator().validate_minimum_functionality(None)?;
    assert!(record.outcome());
    assert!(record.evidence().is_empty());
    Ok(())
}

#[test]
fn test_minimum_functionality_reports_failures() -> Result<()> {
    let minimum = Table::new(
        vec!["Age", "Sex", "Fare", "Survived"],
        vec![
            vec![json!(30.0), json!("female"), json!(100.0), json!(1)],
            vec![json!(60.0), json!("male"), json!(80.0), json!(0)],
        ],
    )?;
    let data = DatasetContext::builder()
        .target("Survived")
        .testing_data(common::titanic_testing())
        .minimum_functionality_data(minimum)
        .build()?;
    let validator = ModelValidator::new(data, ModelContext::new(fare_rule(), ModelType::Classifier));

    let (outcome, evidence) = validator.minimum_functionality()?;
    assert!(!outcome);
    let errors = &evidence["errors_df"];
    assert_eq!(errors["Age"]["1"], json!(60.0));
    assert_eq!(errors["predictions"]["1"], json!(1));
    assert!(errors["Age"].get("0").is_none());
    Ok(())
}

#[test]
fn test_predictions_computed_once_across_threads() -> Result<()> {
    let estimator = fare_rule();
    let validator = titanic_validator_with(estimator.clone());

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let record = validator.validate_minimum_functionality(None).unwrap();
                assert!(record.outcome());
            });
        }
    });

    assert_eq!(estimator.predict_calls(), 1);
    assert!(validator.bound_model().is_cached(Subset::MinimumFunctionality));
    assert!(!validator.bound_model().is_cached(Subset::Test));
    Ok(())
}

#[test]
fn test_shared_contexts_are_not_mutated() -> Result<()> {
    let data = Arc::new(titanic_context());
    let model = Arc::new(ModelContext::new(fare_rule(), ModelType::Classifier));
    let first = ModelValidator::from_shared(Arc::clone(&data), Arc::clone(&model));
    let second = ModelValidator::from_shared(Arc::clone(&data), model);

    first.validate_minimum_functionality(None)?;
    second.validate_biased_performance_across_category("accuracy", "Sex", 0.2, None)?;

    assert_eq!(data.testing_data(), &common::titanic_testing());
    assert_eq!(
        data.minimum_functionality_data(),
        Some(&common::titanic_minimum_functionality())
    );
    Ok(())
}

#[test]
fn test_custom_scorer() -> Result<()> {
    let scorers = CustomScorers::new().with("survival_rate", |estimator, features, _| {
        let predictions = estimator.predict(features)?;
        let survived = predictions.iter().filter(|p| **p == json!(1)).count();
        Ok(survived as f64 / predictions.len() as f64)
    });
    let validator = titanic_validator().with_custom_scorers(scorers);

    let (outcome, evidence) = validator.performance_against_threshold("survival_rate", 0.3)?;
    assert!(outcome);
    assert_eq!(evidence["performance"], json!(0.5));
    Ok(())
}

#[test]
fn test_builtin_metric_wins_over_custom_scorer() -> Result<()> {
    let scorers = CustomScorers::new().with("accuracy", |_, _, _| Ok(1.0));
    let validator = titanic_validator().with_custom_scorers(scorers);

    let (_, evidence) = validator.performance_against_threshold("accuracy", 0.0)?;
    assert_eq!(evidence["performance"], json!(0.5));
    Ok(())
}

#[test]
fn test_compute_performance_and_errors() -> Result<()> {
    let validator = titanic_validator();
    let model = validator.bound_model();

    assert_eq!(model.compute_performance_on_test_set()?, 0.5);
    let errors = model.explore_test_set_errors(false)?;
    assert_eq!(errors.index(), &[1, 2, 3, 4, 9]);
    assert!(errors.has_column("Survived_predictions"));
    Ok(())
}

#[test]
fn test_predict_proba() -> Result<()> {
    let validator = titanic_validator_with(fare_rule().with_probabilities());
    let probabilities = validator.bound_model().predict_proba(Subset::Test)?;

    assert_eq!(probabilities.dim(), (10, 2));
    assert_eq!(probabilities[[5, 1]], 1.0);
    assert_eq!(probabilities[[0, 0]], 1.0);

    let validator = titanic_validator_with(MockEstimator::constant(json!(0)));
    assert!(validator.bound_model().predict_proba(Subset::Test).is_err());
    Ok(())
}
