//! Node sheet import: one sheet becomes one label.
//!
//! Two separably-committed phases per sheet: the `(label, id)` uniqueness
//! constraint is declared and committed first, then one MERGE upsert per
//! retained row goes out as an independent auto-commit statement. Row
//! upserts are fanned out concurrently behind a semaphore; one row's
//! failure never aborts its siblings.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::Semaphore;

use kindred_core::{HeaderSchema, Label, SchemaError, Table, NODE_KEY_FIELD};
use kindred_graph::GraphClient;

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::report::{NodeImportReport, RowError};

/// One retained row, ready to upsert.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlannedNode {
    /// 1-based position among data rows in source order.
    pub row: usize,
    pub id: String,
    pub properties: Map<String, Value>,
}

/// Import one node sheet under the given label.
pub async fn import_nodes(
    graph: &GraphClient,
    label: &Label,
    table: &Table,
    config: &ImportConfig,
) -> Result<NodeImportReport> {
    if label.as_str() == config.relationships_sheet {
        return Err(ImportError::Schema(SchemaError::ReservedLabel {
            label: label.to_string(),
        }));
    }

    let schema = HeaderSchema::derive(&table.header, &config.primary_name_marker)?;
    let (planned, skipped) = plan_rows(label, &schema, &table.rows);

    // Phase one: the constraint, committed before any node write.
    graph
        .ensure_id_constraint(label)
        .await
        .map_err(|source| ImportError::ConstraintFailed {
            label: label.to_string(),
            source,
        })?;

    // Phase two: independent row upserts.
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_upserts));
    let mut handles = Vec::with_capacity(planned.len());

    for node in planned {
        let graph = graph.clone();
        let label = label.clone();
        let semaphore = semaphore.clone();

        handles.push(tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Err((node.row, "semaphore closed".to_string()));
            };
            graph
                .upsert_node(&label, &node.id, &node.properties)
                .await
                .map_err(|e| (node.row, e.to_string()))
        }));
    }

    let mut created = 0;
    let mut errors = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => created += 1,
            Ok(Err((row, message))) => {
                tracing::warn!(label = %label, row, error = %message, "Node upsert failed");
                errors.push(RowError { row, message });
            }
            Err(e) => {
                tracing::error!(label = %label, error = %e, "Node upsert task panicked");
                errors.push(RowError {
                    row: 0,
                    message: format!("task panicked: {e}"),
                });
            }
        }
    }

    tracing::info!(
        label = %label,
        created,
        skipped,
        failed = errors.len(),
        "Node sheet imported"
    );

    Ok(NodeImportReport {
        label: label.to_string(),
        created,
        skipped,
        errors,
    })
}

/// Turn data rows into planned upserts.
///
/// All-empty rows are dropped. Synthetic IDs are `"{label}_{n}"` with `n`
/// the 1-based ordinal among retained rows in source order, so re-imports
/// of the same source assign the same IDs. Empty cells become JSON null,
/// which clears the property on re-import.
pub(crate) fn plan_rows(
    label: &Label,
    schema: &HeaderSchema,
    rows: &[Vec<String>],
) -> (Vec<PlannedNode>, usize) {
    let mut planned = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    let mut ordinal = 0;

    for (i, row) in rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            skipped += 1;
            continue;
        }
        ordinal += 1;

        let natural_key = schema.key_column.and_then(|column| {
            let value = row[column].trim();
            (!value.is_empty()).then(|| value.to_string())
        });
        let id = natural_key.unwrap_or_else(|| format!("{label}_{ordinal}"));

        let mut properties = Map::new();
        for (key, cell) in schema.keys.iter().zip(row) {
            let value = if cell.trim().is_empty() {
                Value::Null
            } else {
                Value::String(cell.clone())
            };
            properties.insert(key.clone(), value);
        }
        properties.insert(NODE_KEY_FIELD.to_string(), Value::String(id.clone()));

        planned.push(PlannedNode {
            row: i + 1,
            id,
            properties,
        });
    }

    (planned, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(headers: &[&str]) -> HeaderSchema {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        HeaderSchema::derive(&headers, "Name").unwrap()
    }

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_synthetic_ids_are_deterministic() {
        let label = Label::from_sheet_name("Sheet1").unwrap();
        let (planned, skipped) = plan_rows(
            &label,
            &schema(&["col"]),
            &rows(&[&["a"], &["b"], &["c"]]),
        );

        assert_eq!(skipped, 0);
        let ids: Vec<_> = planned.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["Sheet1_1", "Sheet1_2", "Sheet1_3"]);
    }

    #[test]
    fn test_empty_rows_are_filtered_and_do_not_consume_ordinals() {
        let label = Label::from_sheet_name("Sheet1").unwrap();
        let (planned, skipped) = plan_rows(
            &label,
            &schema(&["col"]),
            &rows(&[&["a"], &["  "], &[""], &["b"]]),
        );

        assert_eq!(skipped, 2);
        let ids: Vec<_> = planned.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["Sheet1_1", "Sheet1_2"]);
        // Source row positions are preserved for error reporting.
        assert_eq!(planned[1].row, 4);
    }

    #[test]
    fn test_natural_key_wins_over_synthetic() {
        let label = Label::from_sheet_name("People").unwrap();
        let (planned, _) = plan_rows(
            &label,
            &schema(&["Name", "State"]),
            &rows(&[&["alice", "VT"], &["", "NH"]]),
        );

        assert_eq!(planned[0].id, "alice");
        // Blank key cell falls back to the synthetic ID for its ordinal.
        assert_eq!(planned[1].id, "People_2");
    }

    #[test]
    fn test_properties_include_id_and_nulls() {
        let label = Label::from_sheet_name("People").unwrap();
        let (planned, _) = plan_rows(
            &label,
            &schema(&["Name", "Org Type"]),
            &rows(&[&["alice", ""]]),
        );

        let props = &planned[0].properties;
        assert_eq!(props.get("id"), Some(&Value::String("alice".to_string())));
        assert_eq!(props.get("org_type"), Some(&Value::Null));
        // The key column maps to the id field itself.
        assert_eq!(props.len(), 2);
    }
}
