use std::path::PathBuf;
use thiserror::Error;

/// The main error type for topo-sync operations.
///
/// Every variant is fatal for the run. Import failures reported by
/// `import-gtfs` are not errors; they are collected in an
/// [`ImportReport`](crate::sync::ImportReport) instead.
#[derive(Debug, Error)]
pub enum TopoSyncError {
    #[error("Failed to fetch catalog from {url}: {message}")]
    CatalogFetch { url: String, message: String },

    #[error("Failed to read catalog file {}: {source}", .path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog from {origin}: {source}")]
    CatalogParse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid dataset page URL for '{id}': {message}")]
    DatasetUrl { id: String, message: String },

    #[error("Failed to start `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` exited with {}: {stderr}", display_status(.status))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Command `{command}` returned unexpected output: {message}")]
    UnexpectedOutput { command: String, message: String },

    #[error("Failed to write report: {0}")]
    ReportWrite(#[source] serde_json::Error),

    #[error("{count} GTFS import(s) failed")]
    ImportFailures { count: usize },

    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),
}

pub(crate) fn display_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
