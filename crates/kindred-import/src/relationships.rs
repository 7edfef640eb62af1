//! Relationship sheet import: typed, directed edges between previously
//! imported nodes.
//!
//! Rows run strictly sequentially inside one transaction; an unrecoverable
//! write error rolls back the whole batch. Expected per-row conditions
//! (incomplete rows, missing endpoint nodes) are logged and counted
//! without failing the transaction. Edge properties are replaced wholesale
//! on re-import (last-import-wins).

use serde_json::{Map, Value};

use kindred_core::{HeaderSchema, Label, RelationshipType, Table};
use kindred_graph::{mutations, GraphClient, GraphError};

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::report::{RelationshipImportReport, RowError};

const START_ID_COLUMNS: &[&str] = &["start_node_id", "startnodeid"];
const REL_TYPE_COLUMNS: &[&str] = &["relationship_type", "relationshiptype"];
const END_ID_COLUMNS: &[&str] = &["end_node_id", "endnodeid"];
const START_LABEL_COLUMNS: &[&str] = &["start_node_label", "startnode"];
const END_LABEL_COLUMNS: &[&str] = &["end_node_label", "endnode"];

/// Resolved column positions for the relationships sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RelationshipColumns {
    start_id: usize,
    rel_type: usize,
    end_id: usize,
    start_label: usize,
    end_label: usize,
    properties: Option<usize>,
    rel_id: Option<usize>,
    notes: Option<usize>,
}

impl RelationshipColumns {
    /// Locate the required and optional columns, by normalized header.
    /// Each required column accepts both its spaced and its run-together
    /// spelling ("Start Node ID" and "StartNodeID" both work).
    pub(crate) fn resolve(schema: &HeaderSchema) -> Result<Self> {
        let find = |names: &[&str]| names.iter().find_map(|n| schema.index_of(n));

        let mut missing = Vec::new();
        let mut require = |names: &[&str]| match find(names) {
            Some(index) => index,
            None => {
                missing.push(names[0].to_string());
                0
            }
        };

        let columns = Self {
            start_id: require(START_ID_COLUMNS),
            rel_type: require(REL_TYPE_COLUMNS),
            end_id: require(END_ID_COLUMNS),
            start_label: require(START_LABEL_COLUMNS),
            end_label: require(END_LABEL_COLUMNS),
            properties: find(&["properties"]),
            rel_id: find(&["rel_id", "relid"]),
            notes: find(&["notes"]),
        };

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns { missing });
        }
        Ok(columns)
    }
}

/// Import the distinguished relationships sheet.
pub async fn import_relationships(
    graph: &GraphClient,
    table: &Table,
    config: &ImportConfig,
) -> Result<RelationshipImportReport> {
    let schema = HeaderSchema::derive(&table.header, &config.primary_name_marker)?;
    let columns = RelationshipColumns::resolve(&schema)?;

    let mut report = RelationshipImportReport {
        sheet: table.name.clone(),
        created: 0,
        not_found: 0,
        skipped: Vec::new(),
    };

    if table.is_empty() {
        tracing::info!(sheet = %table.name, "Relationships sheet has no data rows");
        return Ok(report);
    }

    let mut txn = graph.start_txn().await?;

    for (i, row) in table.rows.iter().enumerate() {
        let row_no = i + 1;

        let start_id = row[columns.start_id].trim();
        let end_id = row[columns.end_id].trim();
        let raw_type = row[columns.rel_type].trim();

        if start_id.is_empty() || end_id.is_empty() || raw_type.is_empty() {
            skip_row(&mut report, row_no, "missing start id, type, or end id");
            continue;
        }

        let rel_type = match RelationshipType::parse(raw_type) {
            Ok(t) => t,
            Err(e) => {
                skip_row(&mut report, row_no, &e.to_string());
                continue;
            }
        };
        let start_label = match Label::from_sheet_name(&row[columns.start_label]) {
            Ok(l) => l,
            Err(e) => {
                skip_row(&mut report, row_no, &format!("start label: {e}"));
                continue;
            }
        };
        let end_label = match Label::from_sheet_name(&row[columns.end_label]) {
            Ok(l) => l,
            Err(e) => {
                skip_row(&mut report, row_no, &format!("end label: {e}"));
                continue;
            }
        };

        // Endpoints were committed in the node phase, so this read can
        // stay outside the edge transaction.
        let exists = match graph
            .endpoints_exist(&start_label, start_id, &end_label, end_id)
            .await
        {
            Ok(exists) => exists,
            Err(e) => {
                txn.rollback().await.map_err(GraphError::from)?;
                return Err(e.into());
            }
        };
        if !exists {
            tracing::warn!(
                row = row_no,
                start = %start_id,
                end = %end_id,
                "Endpoint node not found, skipping relationship"
            );
            report.not_found += 1;
            continue;
        }

        let mut properties = columns
            .properties
            .map(|c| parse_properties(&row[c]))
            .unwrap_or_default();
        if let Some(c) = columns.rel_id {
            let value = row[c].trim();
            if !value.is_empty() {
                properties.insert("rel_id".to_string(), Value::String(value.to_string()));
            }
        }
        if let Some(c) = columns.notes {
            let value = row[c].trim();
            if !value.is_empty() {
                properties.insert("notes".to_string(), Value::String(value.to_string()));
            }
        }

        let query = match mutations::merge_edge_query(
            &start_label,
            start_id,
            &rel_type,
            &end_label,
            end_id,
            &properties,
        ) {
            Ok(q) => q,
            Err(e) => {
                txn.rollback().await.map_err(GraphError::from)?;
                return Err(e.into());
            }
        };

        if let Err(e) = txn.run(query).await {
            tracing::error!(row = row_no, error = %e, "Edge merge failed, rolling back batch");
            txn.rollback().await.map_err(GraphError::from)?;
            return Err(ImportError::Graph(e.into()));
        }

        tracing::debug!(
            row = row_no,
            "Merged ({start_id})-[:{rel_type}]->({end_id})"
        );
        report.created += 1;
    }

    txn.commit().await.map_err(GraphError::from)?;

    tracing::info!(
        sheet = %table.name,
        created = report.created,
        not_found = report.not_found,
        skipped = report.skipped.len(),
        "Relationships sheet imported"
    );
    Ok(report)
}

fn skip_row(report: &mut RelationshipImportReport, row: usize, message: &str) {
    tracing::warn!(sheet = %report.sheet, row, reason = %message, "Skipping relationship row");
    report.skipped.push(RowError {
        row,
        message: message.to_string(),
    });
}

/// Parse a free-text properties cell: comma-separated `key: value` pairs.
///
/// Keys are trimmed, lowercased, spaces replaced by underscores; values
/// are trimmed. Segments without a colon are dropped — lenient by design,
/// not a validation failure.
pub fn parse_properties(raw: &str) -> Map<String, Value> {
    let mut properties = Map::new();
    if !raw.contains(':') {
        return properties;
    }

    for segment in raw.split(',') {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        let lowered = key.trim().to_lowercase();
        let key = lowered.split_whitespace().collect::<Vec<_>>().join("_");
        if key.is_empty() {
            continue;
        }
        properties.insert(key, Value::String(value.trim().to_string()));
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties_basic() {
        let props = parse_properties("rating: 5, type: vendor");
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("rating"), Some(&Value::String("5".to_string())));
        assert_eq!(props.get("type"), Some(&Value::String("vendor".to_string())));
    }

    #[test]
    fn test_parse_properties_without_colon_is_empty() {
        assert!(parse_properties("no-colon-here").is_empty());
        assert!(parse_properties("").is_empty());
    }

    #[test]
    fn test_parse_properties_drops_malformed_segments() {
        let props = parse_properties("a: 1, malformed, b: 2");
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("a"), Some(&Value::String("1".to_string())));
        assert_eq!(props.get("b"), Some(&Value::String("2".to_string())));
    }

    #[test]
    fn test_parse_properties_normalizes_keys_and_keeps_colons_in_values() {
        let props = parse_properties("Source URL: https://example.com/x");
        assert_eq!(
            props.get("source_url"),
            Some(&Value::String("https://example.com/x".to_string()))
        );
    }

    fn derive(headers: &[&str]) -> HeaderSchema {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        HeaderSchema::derive(&headers, "Name").unwrap()
    }

    #[test]
    fn test_resolve_columns_spaced_headers() {
        let schema = derive(&[
            "Start Node ID",
            "Relationship Type",
            "End Node ID",
            "Start Node Label",
            "End Node Label",
            "Properties",
            "Rel ID",
            "Notes",
        ]);
        let columns = RelationshipColumns::resolve(&schema).unwrap();
        assert_eq!(columns.start_id, 0);
        assert_eq!(columns.end_label, 4);
        assert_eq!(columns.properties, Some(5));
        assert_eq!(columns.rel_id, Some(6));
        assert_eq!(columns.notes, Some(7));
    }

    #[test]
    fn test_resolve_columns_run_together_headers() {
        let schema = derive(&[
            "StartNodeID",
            "RelationshipType",
            "EndNodeID",
            "StartNode",
            "EndNode",
        ]);
        let columns = RelationshipColumns::resolve(&schema).unwrap();
        assert_eq!(columns.rel_type, 1);
        assert_eq!(columns.properties, None);
    }

    #[test]
    fn test_resolve_columns_reports_all_missing() {
        let schema = derive(&["StartNodeID", "EndNodeID"]);
        let err = RelationshipColumns::resolve(&schema).unwrap_err();
        match err {
            ImportError::MissingColumns { missing } => {
                assert_eq!(
                    missing,
                    vec!["relationship_type", "start_node_label", "end_node_label"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
