//! Write operations for the Neo4j-backed graph.
//!
//! All mutations use MERGE (upsert) semantics so repeating a call is a
//! no-op. Nodes are identified by (label, id property).

use neo4rs::query;

use taggraph_core::{EdgeKey, NodeKey};

use crate::client::{GraphClient, GraphError};

impl GraphClient {
    // ── Nodes ────────────────────────────────────────────────────

    /// Create the node if it does not exist yet.
    pub async fn upsert_node(&self, key: &NodeKey) -> Result<(), GraphError> {
        let cypher = format!(
            "MERGE (n:{label} {{{prop}: $id}})",
            label = key.label.as_str(),
            prop = key.label.id_property(),
        );

        self.run(query(&cypher).param("id", key.id.clone())).await
    }

    /// Delete a node together with all of its relationships.
    pub async fn delete_node(&self, key: &NodeKey) -> Result<(), GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{{prop}: $id}})
             DETACH DELETE n",
            label = key.label.as_str(),
            prop = key.label.id_property(),
        );

        self.run(query(&cypher).param("id", key.id.clone())).await
    }

    // ── Edges ────────────────────────────────────────────────────

    /// Merge an edge between two existing nodes.
    ///
    /// Runs as one statement: both endpoints are matched and the MERGE only
    /// fires when both are present, so a concurrent DETACH DELETE of either
    /// endpoint cannot leave a dangling relationship.
    pub async fn upsert_edge(&self, edge: &EdgeKey) -> Result<(), GraphError> {
        check_edge_labels(edge)?;

        let cypher = format!(
            "OPTIONAL MATCH (a:{from_label} {{{from_prop}: $from_id}})
             OPTIONAL MATCH (b:{to_label} {{{to_prop}: $to_id}})
             FOREACH (_ IN CASE WHEN a IS NOT NULL AND b IS NOT NULL THEN [1] ELSE [] END |
               MERGE (a)-[:{rel}]->(b))
             RETURN a IS NOT NULL AS from_exists, b IS NOT NULL AS to_exists",
            from_label = edge.from.label.as_str(),
            from_prop = edge.from.label.id_property(),
            to_label = edge.to.label.as_str(),
            to_prop = edge.to.label.id_property(),
            rel = edge.kind.as_str(),
        );

        let q = query(&cypher)
            .param("from_id", edge.from.id.clone())
            .param("to_id", edge.to.id.clone());

        let row = self.query_one(q).await?.ok_or_else(|| {
            GraphError::Serialization("edge upsert returned no row".to_string())
        })?;
        let from_exists: bool = row
            .get("from_exists")
            .map_err(|e| GraphError::Serialization(format!("Failed to read from_exists: {e}")))?;
        let to_exists: bool = row
            .get("to_exists")
            .map_err(|e| GraphError::Serialization(format!("Failed to read to_exists: {e}")))?;

        let missing = if !from_exists {
            Some(&edge.from)
        } else if !to_exists {
            Some(&edge.to)
        } else {
            None
        };

        match missing {
            Some(key) => Err(GraphError::EndpointNotFound {
                kind: edge.kind,
                label: key.label,
                id: key.id.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Delete the relationship if present. Both endpoints stay.
    pub async fn delete_edge(&self, edge: &EdgeKey) -> Result<(), GraphError> {
        check_edge_labels(edge)?;

        let cypher = format!(
            "MATCH (a:{from_label} {{{from_prop}: $from_id}})
                   -[r:{rel}]->
                   (b:{to_label} {{{to_prop}: $to_id}})
             DELETE r",
            from_label = edge.from.label.as_str(),
            from_prop = edge.from.label.id_property(),
            to_label = edge.to.label.as_str(),
            to_prop = edge.to.label.id_property(),
            rel = edge.kind.as_str(),
        );

        let q = query(&cypher)
            .param("from_id", edge.from.id.clone())
            .param("to_id", edge.to.id.clone());

        self.run(q).await
    }
}

/// Reject label pairs the relationship kind does not allow.
pub(crate) fn check_edge_labels(edge: &EdgeKey) -> Result<(), GraphError> {
    if edge.kind.accepts(edge.from.label, edge.to.label) {
        Ok(())
    } else {
        Err(GraphError::InvalidArgument(format!(
            "{} cannot connect {} to {}",
            edge.kind, edge.from.label, edge.to.label
        )))
    }
}
