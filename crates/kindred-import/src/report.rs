//! Per-run import reporting.
//!
//! A run never aborts because one sheet failed; instead every sheet's
//! outcome is collected here and the CLI prints the whole report, so
//! callers see more than a binary pass/fail.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The result of one `import_all` call.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub run_id: Uuid,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sheets: Vec<SheetReport>,
}

impl ImportReport {
    /// Number of sheets whose import failed outright.
    pub fn failed_sheets(&self) -> usize {
        self.sheets
            .iter()
            .filter(|s| matches!(s.outcome, SheetOutcome::Failed { .. }))
            .count()
    }
}

/// Outcome for a single sheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub sheet: String,
    #[serde(flatten)]
    pub outcome: SheetOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SheetOutcome {
    Nodes(NodeImportReport),
    Relationships(RelationshipImportReport),
    Failed { error: String },
}

/// Counters for one node sheet.
#[derive(Debug, Clone, Serialize)]
pub struct NodeImportReport {
    pub label: String,
    /// Rows upserted successfully.
    pub created: usize,
    /// All-empty rows filtered out before import.
    pub skipped: usize,
    /// Row-level upsert failures; siblings were not aborted.
    pub errors: Vec<RowError>,
}

/// Counters for the relationships sheet.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipImportReport {
    pub sheet: String,
    /// Edges merged.
    pub created: usize,
    /// Rows whose start or end node does not exist in the graph.
    pub not_found: usize,
    /// Rows skipped by per-row validation.
    pub skipped: Vec<RowError>,
}

/// A row-scoped failure, 1-based over data rows in source order.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}
