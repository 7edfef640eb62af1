//! kindred-import: the sheet-to-graph import pipeline.
//!
//! Fetches tabular data from a Google spreadsheet or a remote CSV,
//! normalizes headers into storage-safe property keys, and upserts the
//! result into Neo4j in two phases: node sheets first (concurrently),
//! then the single distinguished relationships sheet.

pub mod config;
pub mod error;
pub mod nodes;
pub mod orchestrator;
pub mod relationships;
pub mod report;
pub mod source;

pub use config::ImportConfig;
pub use error::{ImportError, Result};
pub use orchestrator::Importer;
pub use report::ImportReport;
pub use source::Source;
