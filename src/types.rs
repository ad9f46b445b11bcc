//! Core data types: tabular datasets, model kinds, severities and raw check outcomes

use crate::error::{Result, ValidationError};
use ndarray::{concatenate, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Structured supporting data explaining a check's outcome
pub type Evidence = serde_json::Map<String, Value>;

/// Raw `(outcome, evidence)` pair produced by every check before wrapping
pub type RawOutcome = (bool, Evidence);

/// Build an evidence mapping from key/value pairs
pub fn evidence_from<K, I>(pairs: I) -> Evidence
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Declared kind of a fitted estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Classifier,
    Regressor,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classifier => write!(f, "classifier"),
            Self::Regressor => write!(f, "regressor"),
        }
    }
}

/// Dataset split that predictions can be requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subset {
    Test,
    Train,
    MinimumFunctionality,
}

impl std::fmt::Display for Subset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Test => write!(f, "testing"),
            Self::Train => write!(f, "training"),
            Self::MinimumFunctionality => write!(f, "minimum functionality"),
        }
    }
}

/// Caller-assigned importance label attached to a result record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Compare two labels, treating numerically equal numbers (`1` and `1.0`) as equal
#[must_use]
pub fn labels_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Canonical grouping key for a label
///
/// Integral numbers map to the same key regardless of their JSON representation.
#[must_use]
pub fn label_key(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            },
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Total order over labels: nulls, booleans, numbers, then strings
#[must_use]
pub fn compare_labels(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(_), Value::Number(_)) => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a)
            .cmp(&rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

/// Interpret a label as a number for regression metrics and range checks
pub fn value_as_f64(value: &Value, context: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            ValidationError::scoring(format!("{} value {} is not representable as f64", context, n))
        }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(ValidationError::scoring(format!(
            "{} value {} is not numeric",
            context, other
        ))),
    }
}

/// Labeled tabular dataset: rows × named columns
///
/// Cells are JSON values so that numeric and categorical columns can live side by side.
/// Every table carries the row labels of the data it was derived from, so subsets
/// produced by [`Table::select_rows`] still point at the caller's original rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: Vec<usize>,
    data: Array2<Value>,
}

impl Table {
    /// Build a table from column names and row-major values
    ///
    /// # Errors
    /// - Duplicate column names
    /// - A row whose length differs from the number of columns
    pub fn new<S: Into<String>>(columns: Vec<S>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let n_columns = columns.len();
        let n_rows = rows.len();

        let mut flat = Vec::with_capacity(n_rows * n_columns);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_columns {
                return Err(ValidationError::invalid_argument(format!(
                    "Row {} has {} values but the table has {} columns",
                    i,
                    row.len(),
                    n_columns
                )));
            }
            flat.extend(row);
        }

        let data = Array2::from_shape_vec((n_rows, n_columns), flat)
            .map_err(|e| ValidationError::invalid_argument(format!("Invalid table shape: {}", e)))?;
        Self::from_array(columns, data)
    }

    /// Build a table from an existing 2-D array
    pub fn from_array<S: Into<String>>(columns: Vec<S>, data: Array2<Value>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.len() != data.ncols() {
            return Err(ValidationError::invalid_argument(format!(
                "{} column names given for {} columns of data",
                columns.len(),
                data.ncols()
            )));
        }
        for (i, name) in columns.iter().enumerate() {
            if columns.iter().skip(i + 1).any(|other| other == name) {
                return Err(ValidationError::invalid_argument(format!(
                    "Duplicate column name '{}'",
                    name
                )));
            }
        }

        let index = (0..data.nrows()).collect();
        Ok(Self {
            columns,
            index,
            data,
        })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row labels inherited from the table this one was derived from
    #[must_use]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.data.ncols()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    #[must_use]
    pub fn values(&self) -> ArrayView2<'_, Value> {
        self.data.view()
    }

    #[must_use]
    pub fn row(&self, position: usize) -> Option<ArrayView1<'_, Value>> {
        (position < self.n_rows()).then(|| self.data.row(position))
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, failing with `UnknownColumn` naming `context`
    pub fn require_column(&self, name: &str, context: &str) -> Result<usize> {
        self.column_position(name)
            .ok_or_else(|| ValidationError::unknown_column(name, context))
    }

    /// Read-only view over one column
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, Value>> {
        let position = self.require_column(name, "dataset")?;
        Ok(self.data.column(position))
    }

    /// Project the table onto the named columns, in the given order
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let positions = names
            .iter()
            .map(|n| self.require_column(n.as_ref(), "dataset"))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            columns: names.iter().map(|n| n.as_ref().to_string()).collect(),
            index: self.index.clone(),
            data: self.data.select(Axis(1), &positions),
        })
    }

    /// Keep only the rows at the given positions, preserving their row labels
    #[must_use]
    pub fn select_rows(&self, positions: &[usize]) -> Self {
        let positions: Vec<usize> = positions
            .iter()
            .copied()
            .filter(|&p| p < self.n_rows())
            .collect();
        let index = positions
            .iter()
            .filter_map(|&p| self.index.get(p).copied())
            .collect();

        Self {
            columns: self.columns.clone(),
            index,
            data: self.data.select(Axis(0), &positions),
        }
    }

    /// Return a copy with `name` set to `values`, replacing an existing column of that name
    pub fn with_column(&self, name: &str, values: ArrayView1<'_, Value>) -> Result<Self> {
        if values.len() != self.n_rows() {
            return Err(ValidationError::invalid_argument(format!(
                "Column '{}' has {} values but the table has {} rows",
                name,
                values.len(),
                self.n_rows()
            )));
        }

        let mut copy = self.clone();
        if let Some(position) = self.column_position(name) {
            copy.data.column_mut(position).assign(&values);
            return Ok(copy);
        }

        let extra = values.to_owned().insert_axis(Axis(1));
        copy.data = concatenate(Axis(1), &[self.data.view(), extra.view()]).map_err(|e| {
            ValidationError::internal(format!("Failed to append column '{}': {}", name, e))
        })?;
        copy.columns.push(name.to_string());
        Ok(copy)
    }

    /// Return a copy with columns renamed according to `mapping`
    #[must_use]
    pub fn rename_columns(&self, mapping: &HashMap<String, String>) -> Self {
        let mut copy = self.clone();
        for column in &mut copy.columns {
            if let Some(renamed) = mapping.get(column) {
                column.clone_from(renamed);
            }
        }
        copy
    }

    /// Column-oriented dictionary: `{column: {row_label: value}}`
    #[must_use]
    pub fn to_column_dict(&self) -> Value {
        let mut dict = serde_json::Map::new();
        for (position, name) in self.columns.iter().enumerate() {
            let cells: serde_json::Map<String, Value> = self
                .index
                .iter()
                .zip(self.data.column(position))
                .map(|(label, value)| (label.to_string(), value.clone()))
                .collect();
            dict.insert(name.clone(), Value::Object(cells));
        }
        Value::Object(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use serde_json::json;

    fn sample() -> Table {
        Table::new(
            vec!["Age", "Sex", "Survived"],
            vec![
                vec![json!(22.0), json!("male"), json!(0)],
                vec![json!(38.0), json!("female"), json!(1)],
                vec![json!(26.0), json!("female"), json!(1)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_table_shape() {
        let table = sample();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_columns(), 3);
        assert_eq!(table.index(), &[0, 1, 2]);
        assert!(table.has_column("Sex"));
        assert!(!table.has_column("Fare"));
    }

    #[test]
    fn test_table_rejects_ragged_rows() {
        let result = Table::new(vec!["a", "b"], vec![vec![json!(1)]]);
        assert!(matches!(result, Err(ValidationError::InvalidArgument(_))));
    }

    #[test]
    fn test_table_rejects_duplicate_columns() {
        let result = Table::new(vec!["a", "a"], vec![vec![json!(1), json!(2)]]);
        assert!(matches!(result, Err(ValidationError::InvalidArgument(_))));
    }

    #[test]
    fn test_select_rows_keeps_labels() {
        let table = sample().select_rows(&[2, 0]);
        assert_eq!(table.index(), &[2, 0]);
        assert_eq!(table.column("Age").unwrap()[0], json!(26.0));
    }

    #[test]
    fn test_select_columns_unknown() {
        let err = sample().select_columns(&["Fare"]).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownColumn { .. }));
    }

    #[test]
    fn test_with_column_is_copy_on_write() {
        let table = sample();
        let predictions = Array1::from(vec![json!(0), json!(0), json!(1)]);
        let extended = table.with_column("predictions", predictions.view()).unwrap();

        assert_eq!(extended.n_columns(), 4);
        assert_eq!(table.n_columns(), 3);
        assert!(!table.has_column("predictions"));

        let replaced = extended
            .with_column("predictions", Array1::from(vec![json!(1); 3]).view())
            .unwrap();
        assert_eq!(replaced.n_columns(), 4);
        assert_eq!(replaced.column("predictions").unwrap()[0], json!(1));
    }

    #[test]
    fn test_to_column_dict() {
        let dict = sample().select_rows(&[1]).to_column_dict();
        assert_eq!(dict["Sex"]["1"], json!("female"));
        assert_eq!(dict["Survived"]["1"], json!(1));
    }

    #[test]
    fn test_label_helpers() {
        assert!(labels_equal(&json!(1), &json!(1.0)));
        assert!(!labels_equal(&json!("1"), &json!(1)));
        assert_eq!(label_key(&json!(1)), label_key(&json!(1.0)));
        assert_ne!(label_key(&json!("1")), label_key(&json!(1)));
        assert_eq!(compare_labels(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_labels(&json!(3), &json!("a")), Ordering::Less);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ModelType::Classifier.to_string(), "classifier");
        assert_eq!(Subset::MinimumFunctionality.to_string(), "minimum functionality");
        assert_eq!(Severity::default(), Severity::Info);
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
    }
}
