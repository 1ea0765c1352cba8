//! Read operations for the Neo4j-backed graph.

use std::collections::BTreeSet;

use neo4rs::query;

use taggraph_core::{EdgeKey, NodeKey, NodeLabel};

use crate::client::{GraphClient, GraphError};
use crate::mutations::check_edge_labels;
use crate::store::{OverlapSnapshot, TagMatches};

impl GraphClient {
    // ── Existence ────────────────────────────────────────────────

    /// Whether a node with this label and id exists.
    pub async fn node_exists(&self, key: &NodeKey) -> Result<bool, GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{{prop}: $id}})
             RETURN count(n) > 0 AS found",
            label = key.label.as_str(),
            prop = key.label.id_property(),
        );

        let q = query(&cypher).param("id", key.id.clone());

        let row = self.query_one(q).await?.ok_or_else(|| missing_row("node_exists"))?;
        read_bool(&row, "found")
    }

    /// Whether this exact relationship exists.
    pub async fn edge_exists(&self, edge: &EdgeKey) -> Result<bool, GraphError> {
        check_edge_labels(edge)?;

        let cypher = format!(
            "MATCH (a:{from_label} {{{from_prop}: $from_id}})
                   -[r:{rel}]->
                   (b:{to_label} {{{to_prop}: $to_id}})
             RETURN count(r) > 0 AS found",
            from_label = edge.from.label.as_str(),
            from_prop = edge.from.label.id_property(),
            to_label = edge.to.label.as_str(),
            to_prop = edge.to.label.id_property(),
            rel = edge.kind.as_str(),
        );

        let q = query(&cypher)
            .param("from_id", edge.from.id.clone())
            .param("to_id", edge.to.id.clone());

        let row = self.query_one(q).await?.ok_or_else(|| missing_row("edge_exists"))?;
        read_bool(&row, "found")
    }

    /// Count nodes carrying a label.
    pub async fn count_nodes(&self, label: NodeLabel) -> Result<u64, GraphError> {
        let cypher = format!("MATCH (n:{}) RETURN count(n) AS cnt", label.as_str());

        let row = self
            .query_one(query(&cypher))
            .await?
            .ok_or_else(|| missing_row("count_nodes"))?;
        let cnt: i64 = row
            .get("cnt")
            .map_err(|e| GraphError::Serialization(format!("Failed to read cnt: {e}")))?;
        u64::try_from(cnt)
            .map_err(|_| GraphError::Serialization(format!("Negative node count {cnt}")))
    }

    // ── Adjacency ────────────────────────────────────────────────

    /// Tags attached to a person or project.
    pub async fn tags_of(&self, key: &NodeKey) -> Result<BTreeSet<String>, GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{{prop}: $id}})-[:has_tag]->(t:Tag)
             RETURN t.tag_id AS tag_id",
            label = key.label.as_str(),
            prop = key.label.id_property(),
        );

        let rows = self
            .query_rows(query(&cypher).param("id", key.id.clone()))
            .await?;
        rows.into_iter().map(|row| read_string(&row, "tag_id")).collect()
    }

    /// Persons tagged with any of `tag_ids`, with the tags each one matched.
    pub async fn persons_with_any_tag(
        &self,
        tag_ids: &BTreeSet<String>,
    ) -> Result<TagMatches, GraphError> {
        if tag_ids.is_empty() {
            return Ok(TagMatches::new());
        }

        let q = query(
            "MATCH (p:Person)-[:has_tag]->(t:Tag)
             WHERE t.tag_id IN $tag_ids
             RETURN p.person_id AS person_id, collect(DISTINCT t.tag_id) AS tag_ids",
        )
        .param("tag_ids", tag_ids.iter().cloned().collect::<Vec<_>>());

        let rows = self.query_rows(q).await?;
        let mut matches = TagMatches::new();
        for row in rows {
            let person_id = read_string(&row, "person_id")?;
            let tags = read_strings(&row, "tag_ids")?;
            matches.insert(person_id, tags.into_iter().collect());
        }
        Ok(matches)
    }

    /// Persons that are members of the project.
    pub async fn members_of(&self, project_id: &str) -> Result<BTreeSet<String>, GraphError> {
        let q = query(
            "MATCH (p:Person)-[:member_of]->(:Project {project_id: $project_id})
             RETURN p.person_id AS person_id",
        )
        .param("project_id", project_id.to_string());

        let rows = self.query_rows(q).await?;
        rows.into_iter()
            .map(|row| read_string(&row, "person_id"))
            .collect()
    }

    // ── Recommendation Input ─────────────────────────────────────

    /// Read everything the recommendation needs in a single statement, so
    /// tags, members and candidates all come from the same view.
    ///
    /// Produces one row per candidate person, or a single row with a null
    /// `person_id` when there are none.
    pub async fn overlap_snapshot(
        &self,
        project_id: &str,
    ) -> Result<Option<OverlapSnapshot>, GraphError> {
        let q = query(
            "OPTIONAL MATCH (p:Project {project_id: $project_id})
             OPTIONAL MATCH (p)-[:has_tag]->(pt:Tag)
             WITH p, collect(DISTINCT pt.tag_id) AS project_tags
             OPTIONAL MATCH (p)<-[:member_of]-(m:Person)
             WITH p, project_tags, collect(DISTINCT m.person_id) AS members
             OPTIONAL MATCH (p)-[:has_tag]->(t:Tag)<-[:has_tag]-(c:Person)
             RETURN p IS NOT NULL AS project_exists, project_tags, members,
                    c.person_id AS person_id, collect(DISTINCT t.tag_id) AS shared",
        )
        .param("project_id", project_id.to_string());

        let rows = self.query_rows(q).await?;
        let first = rows.first().ok_or_else(|| missing_row("overlap_snapshot"))?;
        if !read_bool(first, "project_exists")? {
            return Ok(None);
        }

        let project_tags = read_strings(first, "project_tags")?;
        let members = read_strings(first, "members")?;

        let mut candidates = TagMatches::new();
        for row in &rows {
            // Null when the project has no tag-sharing persons.
            let person_id: Option<String> = row.get("person_id").map_err(|e| {
                GraphError::Serialization(format!("Failed to read person_id: {e}"))
            })?;
            let Some(person_id) = person_id else {
                continue;
            };
            let shared = read_strings(row, "shared")?;
            candidates.insert(person_id, shared.into_iter().collect());
        }

        tracing::debug!(
            project_id,
            tags = project_tags.len(),
            members = members.len(),
            candidates = candidates.len(),
            "Read overlap snapshot"
        );

        Ok(Some(OverlapSnapshot {
            project_tags: project_tags.into_iter().collect(),
            members: members.into_iter().collect(),
            candidates,
        }))
    }
}

fn read_string(row: &neo4rs::Row, column: &str) -> Result<String, GraphError> {
    row.get::<String>(column)
        .map_err(|e| GraphError::Serialization(format!("Failed to read {column}: {e}")))
}

fn read_bool(row: &neo4rs::Row, column: &str) -> Result<bool, GraphError> {
    row.get::<bool>(column)
        .map_err(|e| GraphError::Serialization(format!("Failed to read {column}: {e}")))
}

fn read_strings(row: &neo4rs::Row, column: &str) -> Result<Vec<String>, GraphError> {
    row.get::<Vec<String>>(column)
        .map_err(|e| GraphError::Serialization(format!("Failed to read {column}: {e}")))
}

/// Aggregating statements always yield a row; an empty stream means the
/// response was cut short.
fn missing_row(operation: &str) -> GraphError {
    GraphError::Serialization(format!("{operation} returned no row"))
}
