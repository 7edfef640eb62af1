//! Error types for the kindred-import crate.
//!
//! Failures local to one row are aggregated into reports; failures local
//! to one sheet surface as `ImportError` and are caught per sheet by the
//! orchestrator. Only source-listing failures abort an entire run.

use thiserror::Error;

use kindred_core::{SchemaError, TableError};
use kindred_graph::GraphError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Malformed source: {0}")]
    MalformedSource(#[from] TableError),

    #[error("Failed to parse CSV: {0}")]
    CsvParse(String),

    #[error("Invalid spreadsheet URL: {0}")]
    InvalidUrl(String),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Constraint declaration failed for {label}: {source}")]
    ConstraintFailed {
        label: String,
        #[source]
        source: GraphError,
    },

    #[error("Relationships sheet is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, ImportError>;
