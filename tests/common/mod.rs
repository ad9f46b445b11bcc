//! Shared fixtures for integration tests
//!
//! A small Titanic-like classification dataset scored by a fare threshold
//! rule, and a regression dataset scored by an identity rule.

#![allow(dead_code)]

use model_validator::{
    test_utils::MockEstimator, DatasetContext, ModelContext, ModelType, ModelValidator, Table,
};
use serde_json::{json, Value};

pub const TITANIC_COLUMNS: [&str; 4] = ["Age", "Sex", "Fare", "Survived"];

fn titanic_table(rows: &[(f64, &str, f64, i64)]) -> Table {
    Table::new(
        TITANIC_COLUMNS.to_vec(),
        rows.iter()
            .map(|(age, sex, fare, survived)| {
                vec![json!(age), json!(sex), json!(fare), json!(survived)]
            })
            .collect(),
    )
    .expect("valid titanic fixture")
}

/// Ten test rows: accuracy 0.5 overall, 0.2 for male rows and 0.8 for female rows
pub fn titanic_testing() -> Table {
    titanic_table(&[
        (22.0, "male", 10.0, 0),
        (35.0, "male", 30.0, 0),
        (54.0, "male", 31.0, 0),
        (2.0, "male", 5.0, 1),
        (27.0, "male", 7.0, 1),
        (38.0, "female", 50.0, 1),
        (26.0, "female", 53.0, 1),
        (14.0, "female", 8.0, 0),
        (4.0, "female", 9.0, 0),
        (58.0, "female", 40.0, 0),
    ])
}

/// Six training rows: accuracy 4/6, most frequent label 0
pub fn titanic_training() -> Table {
    titanic_table(&[
        (30.0, "male", 10.0, 0),
        (31.0, "male", 12.0, 0),
        (32.0, "female", 15.0, 0),
        (33.0, "male", 25.0, 0),
        (34.0, "female", 60.0, 1),
        (35.0, "female", 9.0, 1),
    ])
}

/// Rows the fare rule gets right
pub fn titanic_minimum_functionality() -> Table {
    titanic_table(&[(30.0, "female", 100.0, 1), (40.0, "male", 2.0, 0)])
}

/// Survives when `Fare > 20`
pub fn fare_rule() -> MockEstimator {
    MockEstimator::threshold("Fare", 20.0, json!(1), json!(0))
}

pub fn titanic_context() -> DatasetContext {
    DatasetContext::builder()
        .target("Survived")
        .testing_data(titanic_testing())
        .training_data(titanic_training())
        .minimum_functionality_data(titanic_minimum_functionality())
        .build()
        .expect("valid titanic context")
}

pub fn titanic_validator_with(estimator: MockEstimator) -> ModelValidator {
    ModelValidator::new(
        titanic_context(),
        ModelContext::new(estimator, ModelType::Classifier),
    )
}

pub fn titanic_validator() -> ModelValidator {
    titanic_validator_with(fare_rule())
}

fn xy_table(rows: &[(f64, f64)]) -> Table {
    Table::new(
        vec!["x", "y"],
        rows.iter().map(|(x, y)| vec![json!(x), json!(y)]).collect(),
    )
    .expect("valid regression fixture")
}

/// Regression data predicted by echoing `x`
pub fn regression_context(minimum_functionality: &[(f64, f64)]) -> DatasetContext {
    DatasetContext::builder()
        .target("y")
        .testing_data(xy_table(&[(1.0, 1.1), (2.0, 1.9), (3.0, 3.2), (4.0, 3.8)]))
        .training_data(xy_table(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]))
        .minimum_functionality_data(xy_table(minimum_functionality))
        .build()
        .expect("valid regression context")
}

pub fn regression_validator(minimum_functionality: &[(f64, f64)]) -> ModelValidator {
    ModelValidator::new(
        regression_context(minimum_functionality),
        ModelContext::new(MockEstimator::echo("x"), ModelType::Regressor),
    )
}

/// Testing data whose `bucket` column has `distinct` values over `rows` rows
pub fn bucketed_table(rows: usize, distinct: usize) -> Table {
    Table::new(
        vec!["x", "bucket", "y"],
        (0..rows)
            .map(|i| vec![json!(i % 2), json!(format!("b{}", i % distinct)), json!(i % 2)])
            .collect::<Vec<Vec<Value>>>(),
    )
    .expect("valid bucketed fixture")
}

pub fn bucketed_validator(rows: usize, distinct: usize) -> ModelValidator {
    let data = DatasetContext::builder()
        .target("y")
        .features(["x"])
        .testing_data(bucketed_table(rows, distinct))
        .build()
        .expect("valid bucketed context");
    ModelValidator::new(
        data,
        ModelContext::new(MockEstimator::echo("x"), ModelType::Classifier),
    )
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
