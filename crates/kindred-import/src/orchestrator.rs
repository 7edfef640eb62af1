//! Import orchestration: fetch → normalize → nodes → relationships.
//!
//! Node sheets are imported concurrently, one spawned task per sheet,
//! with failures isolated per sheet. The relationship phase starts only
//! after every node task has settled, because edges match on nodes the
//! first phase committed. No retries happen at this layer.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use kindred_core::Label;
use kindred_graph::GraphClient;

use crate::config::ImportConfig;
use crate::error::Result;
use crate::report::{ImportReport, NodeImportReport, RelationshipImportReport, SheetOutcome, SheetReport};
use crate::source::Source;
use crate::{nodes, relationships};

/// Runs a full import of one source into the graph.
pub struct Importer {
    source: Arc<Source>,
    graph: GraphClient,
    config: ImportConfig,
}

impl Importer {
    pub fn new(source: Source, graph: GraphClient, config: ImportConfig) -> Self {
        Self {
            source: Arc::new(source),
            graph,
            config,
        }
    }

    /// Import every sheet in the source and return the per-sheet report.
    ///
    /// Only a failure to list the source's tables aborts the run; every
    /// sheet-level failure is captured in the report instead.
    pub async fn import_all(&self) -> Result<ImportReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let names = self.source.list_tables().await?;
        let (node_sheets, relationship_sheet) =
            partition_sheets(names, &self.config.relationships_sheet);

        tracing::info!(
            run_id = %run_id,
            source = %self.source.describe(),
            node_sheets = ?node_sheets,
            relationship_sheet = ?relationship_sheet,
            "Starting import run"
        );

        // Phase one: node sheets, one task each.
        let mut handles = Vec::with_capacity(node_sheets.len());
        for sheet in node_sheets {
            let source = self.source.clone();
            let graph = self.graph.clone();
            let config = self.config.clone();

            handles.push(tokio::spawn(async move {
                let outcome = match run_node_sheet(&source, &graph, &config, &sheet).await {
                    Ok(report) => SheetOutcome::Nodes(report),
                    Err(e) => {
                        tracing::error!(sheet = %sheet, error = %e, "Node sheet import failed");
                        SheetOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                SheetReport { sheet, outcome }
            }));
        }

        let mut sheets = Vec::with_capacity(handles.len() + 1);
        for handle in handles {
            match handle.await {
                Ok(report) => sheets.push(report),
                Err(e) => {
                    tracing::error!(error = %e, "Node sheet task panicked");
                    sheets.push(SheetReport {
                        sheet: String::new(),
                        outcome: SheetOutcome::Failed {
                            error: format!("task panicked: {e}"),
                        },
                    });
                }
            }
        }

        // Phase two: the relationships sheet, after all node sheets settle.
        match relationship_sheet {
            Some(sheet) => {
                let outcome = match self.run_relationship_sheet(&sheet).await {
                    Ok(report) => SheetOutcome::Relationships(report),
                    Err(e) => {
                        tracing::error!(sheet = %sheet, error = %e, "Relationship import failed");
                        SheetOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                sheets.push(SheetReport { sheet, outcome });
            }
            None => {
                tracing::info!("No relationships sheet found, skipping relationship phase");
            }
        }

        let report = ImportReport {
            run_id,
            source: self.source.describe(),
            started_at,
            finished_at: Utc::now(),
            sheets,
        };
        tracing::info!(
            run_id = %run_id,
            sheets = report.sheets.len(),
            failed = report.failed_sheets(),
            "Import run finished"
        );
        Ok(report)
    }

    async fn run_relationship_sheet(&self, sheet: &str) -> Result<RelationshipImportReport> {
        let table = self.source.fetch_table(sheet).await?;
        relationships::import_relationships(&self.graph, &table, &self.config).await
    }
}

async fn run_node_sheet(
    source: &Source,
    graph: &GraphClient,
    config: &ImportConfig,
    sheet: &str,
) -> Result<NodeImportReport> {
    let label = Label::from_sheet_name(sheet)?;
    let table = source.fetch_table(sheet).await?;
    nodes::import_nodes(graph, &label, &table, config).await
}

/// Split sheet names into node sheets and the single distinguished
/// relationships sheet (exact name match).
fn partition_sheets(names: Vec<String>, reserved: &str) -> (Vec<String>, Option<String>) {
    let mut node_sheets = Vec::with_capacity(names.len());
    let mut relationship_sheet = None;

    for name in names {
        if name == reserved {
            relationship_sheet = Some(name);
        } else {
            node_sheets.push(name);
        }
    }
    (node_sheets, relationship_sheet)
}
