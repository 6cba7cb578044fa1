//! Outcome types of the sync commands.

use serde::Serialize;
use std::fmt;

use crate::error::display_status;

/// Totals of an import run, for one dataset or the whole catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Datasets processed.
    pub datasets: usize,
    /// Qualifying GTFS resources for which an import was attempted.
    pub resources: usize,
    /// Imports whose command exited non-zero.
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ImportReport) {
        self.datasets += other.datasets;
        self.resources += other.resources;
        self.failures.extend(other.failures);
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} datasets and {} resources imported",
            self.datasets, self.resources
        )?;

        if !self.failures.is_empty() {
            writeln!(f, "{} failed import(s):", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  - {}", failure)?;
            }
        }

        Ok(())
    }
}

/// A GTFS import whose command did not succeed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub dataset: String,
    pub producer: String,
    pub command: String,
    /// Exit code, `None` if the import was killed by a signal.
    pub status: Option<i32>,
    pub resource: Option<String>,
}

impl fmt::Display for ImportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dataset '{}' (producer {}), resource '{}': `{}` exited with {}",
            self.dataset,
            self.producer,
            self.resource.as_deref().unwrap_or("<untitled>"),
            self.command,
            display_status(&self.status)
        )
    }
}

/// Totals of a producer creation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreationSummary {
    pub datasets: usize,
    pub created: usize,
    /// Datasets skipped for lack of a title.
    pub skipped: usize,
}

impl fmt::Display for CreationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} datasets, {} producers created, {} skipped",
            self.datasets, self.created, self.skipped
        )
    }
}
