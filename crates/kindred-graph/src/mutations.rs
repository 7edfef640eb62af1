//! Write operations for the relationship graph.
//!
//! All writes use MERGE (upsert) semantics so re-importing the same
//! source is idempotent for node and edge existence. Nodes are identified
//! by `(label, id)`; node properties are merged in (`SET n +=`), edge
//! properties are replaced wholesale (`SET r =`, last-import-wins).
//!
//! Map-valued parameters travel as JSON strings and are applied with
//! `apoc.convert.fromJsonMap`.

use neo4rs::{query, Query};
use serde_json::{Map, Value};

use kindred_core::{Label, RelationshipType};

use crate::client::{GraphClient, GraphError};

/// Build the upsert query for one node row.
pub fn upsert_node_query(
    label: &Label,
    id: &str,
    properties: &Map<String, Value>,
) -> Result<Query, GraphError> {
    let props_json =
        serde_json::to_string(properties).map_err(|e| GraphError::Serialization(e.to_string()))?;

    let cypher = format!(
        "MERGE (n:{label} {{id: $id}})
         SET n += apoc.convert.fromJsonMap($props)"
    );

    Ok(query(&cypher)
        .param("id", id.to_string())
        .param("props", props_json))
}

/// Build the merge query for one edge row.
///
/// Both endpoints are matched on `(label, id)`; if either is absent the
/// MATCH yields no rows and the statement is a no-op.
pub fn merge_edge_query(
    start_label: &Label,
    start_id: &str,
    rel_type: &RelationshipType,
    end_label: &Label,
    end_id: &str,
    properties: &Map<String, Value>,
) -> Result<Query, GraphError> {
    let props_json =
        serde_json::to_string(properties).map_err(|e| GraphError::Serialization(e.to_string()))?;

    let cypher = format!(
        "MATCH (source:{start_label} {{id: $start_id}})
         MATCH (target:{end_label} {{id: $end_id}})
         MERGE (source)-[r:{rel_type}]->(target)
         SET r = apoc.convert.fromJsonMap($props)"
    );

    Ok(query(&cypher)
        .param("start_id", start_id.to_string())
        .param("end_id", end_id.to_string())
        .param("props", props_json))
}

impl GraphClient {
    /// Declare the `(label, id)` uniqueness constraint for a label.
    ///
    /// Idempotent (`IF NOT EXISTS`) and auto-committed, so it is visible
    /// before any node write for the label goes out.
    pub async fn ensure_id_constraint(&self, label: &Label) -> Result<(), GraphError> {
        let cypher = format!(
            "CREATE CONSTRAINT unique_{name} IF NOT EXISTS
             FOR (n:{label}) REQUIRE n.id IS UNIQUE",
            name = label.as_str().to_ascii_lowercase(),
        );
        self.run(query(&cypher)).await
    }

    /// Upsert a single node as an independent auto-commit statement.
    pub async fn upsert_node(
        &self,
        label: &Label,
        id: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), GraphError> {
        self.run(upsert_node_query(label, id, properties)?).await
    }

    /// Delete every node and relationship in the database.
    ///
    /// Destructive full reset; only reachable behind the CLI `--reset`
    /// flag.
    pub async fn wipe(&self) -> Result<(), GraphError> {
        tracing::warn!("Wiping the entire graph");
        self.run(query("MATCH (n) DETACH DELETE n")).await
    }
}
