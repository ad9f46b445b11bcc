//! Batch reports and persistence sinks
//!
//! A `ValidationReport` collects the records of many checks. Each check runs in
//! isolation: a failing check is recorded as a `CheckFailure` and the batch
//! carries on.

use crate::{
    error::{Result, ValidationError},
    result::ResultRecord,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A check that raised an error instead of producing a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub check_name: String,
    pub error: String,
}

/// Records and failures collected during one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub run_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub records: Vec<ResultRecord>,
    #[serde(default)]
    pub failures: Vec<CheckFailure>,
}

impl ValidationReport {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Run one check and file its record, or its error, under `check_name`
    ///
    /// Returns whether the check produced a record.
    pub fn record<F>(&mut self, check_name: &str, check: F) -> bool
    where
        F: FnOnce() -> Result<ResultRecord>,
    {
        match check() {
            Ok(record) => {
                self.records.push(record);
                true
            },
            Err(e) => {
                tracing::warn!(check = check_name, error = %e, "Check failed to run");
                self.failures.push(CheckFailure {
                    check_name: check_name.to_string(),
                    error: e.to_string(),
                });
                false
            },
        }
    }

    /// Number of records with a passing outcome
    #[must_use]
    pub fn passed(&self) -> usize {
        self.records.iter().filter(|r| r.outcome()).count()
    }

    /// Number of records with a failing outcome
    #[must_use]
    pub fn failed(&self) -> usize {
        self.records.len() - self.passed()
    }

    /// True when every check ran and every outcome passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty() && self.failed() == 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Destination that reports are saved to and loaded from
pub trait ReportSink {
    fn save(&self, report: &ValidationReport) -> Result<()>;

    fn load(&self) -> Result<ValidationReport>;
}

/// Sink persisting a single report as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonFileSink {
    fn save(&self, report: &ValidationReport) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ValidationError::file_io_error("create report directory", parent, &e)
            })?;
        }
        if self.path.exists() {
            tracing::warn!(path = %self.path.display(), "Overwriting existing report");
        }

        let json = report.to_json()?;
        fs::write(&self.path, json)
            .map_err(|e| ValidationError::file_io_error("write report", &self.path, &e))?;
        tracing::info!(
            path = %self.path.display(),
            run_id = %report.run_id,
            records = report.records.len(),
            "Saved validation report"
        );
        Ok(())
    }

    fn load(&self) -> Result<ValidationReport> {
        let json = fs::read_to_string(&self.path)
            .map_err(|e| ValidationError::file_io_error("read report", &self.path, &e))?;
        ValidationReport::from_json(&json)
    }
}
