//! The `GraphStore` abstraction every backend implements.
//!
//! The store is the single owner of nodes and edges and is responsible for
//! its own locking or transaction discipline. Callers hold it as
//! `Arc<dyn GraphStore>` handed in by whoever owns the connection.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use taggraph_core::{EdgeKey, NodeKey, NodeLabel};

use crate::client::{GraphClient, GraphError};

/// Person id → the subset of requested tags that person carries.
pub type TagMatches = BTreeMap<String, BTreeSet<String>>;

/// Everything the recommendation query needs about one project,
/// read from a single view of the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapSnapshot {
    pub project_tags: BTreeSet<String>,
    pub members: BTreeSet<String>,
    pub candidates: TagMatches,
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Whether the node exists.
    async fn node_exists(&self, key: &NodeKey) -> Result<bool, GraphError>;

    /// Insert the node if absent; no-op otherwise.
    async fn upsert_node(&self, key: &NodeKey) -> Result<(), GraphError>;

    /// Remove the node and every incident edge in one step; no-op if absent.
    async fn delete_node(&self, key: &NodeKey) -> Result<(), GraphError>;

    /// Insert the edge if absent. Fails with `EndpointNotFound` when either
    /// endpoint is missing.
    async fn upsert_edge(&self, edge: &EdgeKey) -> Result<(), GraphError>;

    /// Remove the edge; no-op if it or either endpoint is absent.
    async fn delete_edge(&self, edge: &EdgeKey) -> Result<(), GraphError>;

    /// Whether this exact edge exists.
    async fn edge_exists(&self, edge: &EdgeKey) -> Result<bool, GraphError>;

    /// Ids of the tags reachable over `has_tag` from the node.
    async fn tags_of(&self, key: &NodeKey) -> Result<BTreeSet<String>, GraphError>;

    /// Every person with at least one `has_tag` edge into `tag_ids`,
    /// mapped to the tags it matched.
    async fn persons_with_any_tag(
        &self,
        tag_ids: &BTreeSet<String>,
    ) -> Result<TagMatches, GraphError>;

    /// Ids of the persons with a `member_of` edge into the project.
    async fn members_of(&self, project_id: &str) -> Result<BTreeSet<String>, GraphError>;

    /// Number of nodes carrying the label.
    async fn count_nodes(&self, label: NodeLabel) -> Result<u64, GraphError>;

    /// Confirm the backing engine is reachable.
    async fn ping(&self) -> Result<(), GraphError>;

    /// Read the project's tags, members and tag-matched persons.
    /// Returns `None` when the project does not exist.
    ///
    /// The default composes the individual reads and so offers no snapshot
    /// guarantee; backends that can read atomically override it.
    async fn overlap_snapshot(
        &self,
        project_id: &str,
    ) -> Result<Option<OverlapSnapshot>, GraphError> {
        let project = NodeKey {
            label: NodeLabel::Project,
            id: project_id.to_string(),
        };
        if !self.node_exists(&project).await? {
            return Ok(None);
        }

        let project_tags = self.tags_of(&project).await?;
        if project_tags.is_empty() {
            return Ok(Some(OverlapSnapshot::default()));
        }

        let members = self.members_of(project_id).await?;
        let candidates = self.persons_with_any_tag(&project_tags).await?;

        Ok(Some(OverlapSnapshot {
            project_tags,
            members,
            candidates,
        }))
    }
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn node_exists(&self, key: &NodeKey) -> Result<bool, GraphError> {
        GraphClient::node_exists(self, key).await
    }

    async fn upsert_node(&self, key: &NodeKey) -> Result<(), GraphError> {
        GraphClient::upsert_node(self, key).await
    }

    async fn delete_node(&self, key: &NodeKey) -> Result<(), GraphError> {
        GraphClient::delete_node(self, key).await
    }

    async fn upsert_edge(&self, edge: &EdgeKey) -> Result<(), GraphError> {
        GraphClient::upsert_edge(self, edge).await
    }

    async fn delete_edge(&self, edge: &EdgeKey) -> Result<(), GraphError> {
        GraphClient::delete_edge(self, edge).await
    }

    async fn edge_exists(&self, edge: &EdgeKey) -> Result<bool, GraphError> {
        GraphClient::edge_exists(self, edge).await
    }

    async fn tags_of(&self, key: &NodeKey) -> Result<BTreeSet<String>, GraphError> {
        GraphClient::tags_of(self, key).await
    }

    async fn persons_with_any_tag(
        &self,
        tag_ids: &BTreeSet<String>,
    ) -> Result<TagMatches, GraphError> {
        GraphClient::persons_with_any_tag(self, tag_ids).await
    }

    async fn members_of(&self, project_id: &str) -> Result<BTreeSet<String>, GraphError> {
        GraphClient::members_of(self, project_id).await
    }

    async fn count_nodes(&self, label: NodeLabel) -> Result<u64, GraphError> {
        GraphClient::count_nodes(self, label).await
    }

    async fn ping(&self) -> Result<(), GraphError> {
        GraphClient::ping(self).await
    }

    async fn overlap_snapshot(
        &self,
        project_id: &str,
    ) -> Result<Option<OverlapSnapshot>, GraphError> {
        GraphClient::overlap_snapshot(self, project_id).await
    }
}
