//! Read operations for the relationship graph.

use neo4rs::query;

use kindred_core::Label;

use crate::client::{GraphClient, GraphError};

/// Node count for one label.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

impl GraphClient {
    /// Liveness check: a trivial round-trip query.
    pub async fn ping(&self) -> Result<(), GraphError> {
        self.query_one(query("RETURN 1")).await?;
        Ok(())
    }

    /// Check that a node with the given label and id exists.
    pub async fn node_exists(&self, label: &Label, id: &str) -> Result<bool, GraphError> {
        let cypher = format!("MATCH (n:{label} {{id: $id}}) RETURN n.id AS id LIMIT 1");
        let q = query(&cypher).param("id", id.to_string());
        Ok(self.query_one(q).await?.is_some())
    }

    /// Check that both endpoints of an edge exist, in one round trip.
    pub async fn endpoints_exist(
        &self,
        start_label: &Label,
        start_id: &str,
        end_label: &Label,
        end_id: &str,
    ) -> Result<bool, GraphError> {
        let cypher = format!(
            "MATCH (start:{start_label} {{id: $start_id}})
             MATCH (end:{end_label} {{id: $end_id}})
             RETURN start.id AS s LIMIT 1"
        );
        let q = query(&cypher)
            .param("start_id", start_id.to_string())
            .param("end_id", end_id.to_string());
        Ok(self.query_one(q).await?.is_some())
    }

    /// Count nodes of a given label.
    pub async fn count_nodes(&self, label: &Label) -> Result<i64, GraphError> {
        let cypher = format!("MATCH (n:{label}) RETURN count(n) AS cnt");
        match self.query_one(query(&cypher)).await? {
            Some(row) => Ok(row.get::<i64>("cnt").unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Node counts for every label in the database.
    pub async fn label_counts(&self) -> Result<Vec<LabelCount>, GraphError> {
        let rows = self.query_rows(query("CALL db.labels() YIELD label RETURN label")).await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let label: String = row
                .get("label")
                .map_err(|e| GraphError::Serialization(format!("Failed to read label: {e}")))?;

            // Labels come from the database, not user input; backtick-quote
            // them since they may not be plain identifiers.
            let cypher = format!("MATCH (n:`{label}`) RETURN count(n) AS cnt");
            let count = match self.query_one(query(&cypher)).await? {
                Some(row) => row.get::<i64>("cnt").unwrap_or(0),
                None => 0,
            };
            counts.push(LabelCount { label, count });
        }
        Ok(counts)
    }
}
