//! Built-in metric catalog
//!
//! Metrics take `(y_true, y_pred)` and return a score where greater is better.
//! Error metrics are therefore exposed negated (`neg_mean_squared_error`, ...).

use crate::{
    error::{Result, ValidationError},
    types::{label_key, labels_equal, value_as_f64},
};
use ndarray::ArrayView1;
use serde_json::Value;
use std::collections::BTreeMap;

/// Signature shared by every catalog metric
pub type MetricFn = fn(ArrayView1<'_, Value>, ArrayView1<'_, Value>) -> Result<f64>;

const CATALOG: [(&str, MetricFn); 9] = [
    ("accuracy", accuracy),
    ("balanced_accuracy", balanced_accuracy),
    ("precision", precision),
    ("recall", recall),
    ("f1", f1),
    ("r2", r2),
    ("neg_mean_absolute_error", neg_mean_absolute_error),
    ("neg_mean_squared_error", neg_mean_squared_error),
    ("neg_root_mean_squared_error", neg_root_mean_squared_error),
];

/// Lookup table of built-in metrics keyed by name
pub struct MetricCatalog;

impl MetricCatalog {
    #[must_use]
    pub fn get(name: &str) -> Option<MetricFn> {
        CATALOG
            .iter()
            .find(|(metric, _)| *metric == name)
            .map(|(_, f)| *f)
    }

    #[must_use]
    pub fn contains(name: &str) -> bool {
        Self::get(name).is_some()
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        CATALOG.iter().map(|(name, _)| *name)
    }
}

fn check_lengths(metric: &str, y_true: &ArrayView1<'_, Value>, y_pred: &ArrayView1<'_, Value>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(ValidationError::scoring(format!(
            "{}: y_true has {} values but y_pred has {}",
            metric,
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(ValidationError::scoring(format!(
            "{}: cannot score an empty set of predictions",
            metric
        )));
    }
    Ok(())
}

/// Positive-class membership for a binary label
///
/// Only `0`, `1`, `true` and `false` are accepted.
fn binary_label(metric: &str, label: &Value) -> Result<bool> {
    match label {
        Value::Bool(b) => Ok(*b),
        other if labels_equal(other, &Value::from(1)) => Ok(true),
        other if labels_equal(other, &Value::from(0)) => Ok(false),
        other => Err(ValidationError::scoring(format!(
            "{}: label {} is not binary, expected one of 0, 1, true, false",
            metric, other
        ))),
    }
}

/// Binary confusion counts `(tp, fp, fn)` with `1`/`true` as the positive label
fn confusion(
    metric: &str,
    y_true: ArrayView1<'_, Value>,
    y_pred: ArrayView1<'_, Value>,
) -> Result<(f64, f64, f64)> {
    check_lengths(metric, &y_true, &y_pred)?;
    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut fn_ = 0.0;
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        match (binary_label(metric, t)?, binary_label(metric, p)?) {
            (true, true) => tp += 1.0,
            (false, true) => fp += 1.0,
            (true, false) => fn_ += 1.0,
            (false, false) => {},
        }
    }
    Ok((tp, fp, fn_))
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn numeric_pairs(
    metric: &str,
    y_true: ArrayView1<'_, Value>,
    y_pred: ArrayView1<'_, Value>,
) -> Result<Vec<(f64, f64)>> {
    check_lengths(metric, &y_true, &y_pred)?;
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| Ok((value_as_f64(t, metric)?, value_as_f64(p, metric)?)))
        .collect()
}

/// Fraction of predictions equal to the target
pub fn accuracy(y_true: ArrayView1<'_, Value>, y_pred: ArrayView1<'_, Value>) -> Result<f64> {
    check_lengths("accuracy", &y_true, &y_pred)?;
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| labels_equal(t, p))
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Mean per-class recall over the classes present in `y_true`
pub fn balanced_accuracy(y_true: ArrayView1<'_, Value>, y_pred: ArrayView1<'_, Value>) -> Result<f64> {
    check_lengths("balanced_accuracy", &y_true, &y_pred)?;
    let mut per_class: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let entry = per_class.entry(label_key(t)).or_insert((0, 0));
        entry.1 += 1;
        if labels_equal(t, p) {
            entry.0 += 1;
        }
    }
    let recalls: f64 = per_class
        .values()
        .map(|(hits, total)| *hits as f64 / *total as f64)
        .sum();
    Ok(recalls / per_class.len() as f64)
}

pub fn precision(y_true: ArrayView1<'_, Value>, y_pred: ArrayView1<'_, Value>) -> Result<f64> {
    let (tp, fp, _) = confusion("precision", y_true, y_pred)?;
    Ok(ratio_or_zero(tp, tp + fp))
}

pub fn recall(y_true: ArrayView1<'_, Value>, y_pred: ArrayView1<'_, Value>) -> Result<f64> {
    let (tp, _, fn_) = confusion("recall", y_true, y_pred)?;
    Ok(ratio_or_zero(tp, tp + fn_))
}

pub fn f1(y_true: ArrayView1<'_, Value>, y_pred: ArrayView1<'_, Value>) -> Result<f64> {
    let (tp, fp, fn_) = confusion("f1", y_true, y_pred)?;
    Ok(ratio_or_zero(2.0 * tp, 2.0 * tp + fp + fn_))
}

/// Coefficient of determination
///
/// A constant target scores 1.0 when predicted perfectly and 0.0 otherwise.
pub fn r2(y_true: ArrayView1<'_, Value>, y_pred: ArrayView1<'_, Value>) -> Result<f64> {
    let pairs = numeric_pairs("r2", y_true, y_pred)?;
    let mean = pairs.iter().map(|(t, _)| t).sum::<f64>() / pairs.len() as f64;
    let ss_res: f64 = pairs.iter().map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = pairs.iter().map(|(t, _)| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

pub fn neg_mean_absolute_error(y_true: ArrayView1<'_, Value>, y_pred: ArrayView1<'_, Value>) -> Result<f64> {
    let pairs = numeric_pairs("neg_mean_absolute_error", y_true, y_pred)?;
    let total: f64 = pairs.iter().map(|(t, p)| (t - p).abs()).sum();
    Ok(-(total / pairs.len() as f64))
}

pub fn neg_mean_squared_error(y_true: ArrayView1<'_, Value>, y_pred: ArrayView1<'_, Value>) -> Result<f64> {
    let pairs = numeric_pairs("neg_mean_squared_error", y_true, y_pred)?;
    let total: f64 = pairs.iter().map(|(t, p)| (t - p).powi(2)).sum();
    Ok(-(total / pairs.len() as f64))
}

pub fn neg_root_mean_squared_error(
    y_true: ArrayView1<'_, Value>,
    y_pred: ArrayView1<'_, Value>,
) -> Result<f64> {
    neg_mean_squared_error(y_true, y_pred).map(|mse| -((-mse).sqrt()))
}
