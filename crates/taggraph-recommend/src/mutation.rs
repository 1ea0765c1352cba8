//! Idempotent create/delete operations for nodes and relationships.
//!
//! Node operations pass straight through to the store. Link operations
//! first confirm both endpoints exist so a caller referencing an unknown
//! entity gets `NotFound` naming it; unlink operations have no such
//! precondition.

use std::sync::Arc;

use taggraph_core::{EdgeKey, EdgeKind, NodeKey, TagGraphError};
use taggraph_graph::{GraphError, GraphStore};

use crate::error::Result;

/// Grouped mutations exposed at the service boundary.
#[derive(Clone)]
pub struct MutationService {
    store: Arc<dyn GraphStore>,
}

impl MutationService {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    // ── Nodes ────────────────────────────────────────────────────

    pub async fn create_person(&self, person_id: &str) -> Result<()> {
        self.create(NodeKey::person(person_id)?).await
    }

    pub async fn create_tag(&self, tag_id: &str) -> Result<()> {
        self.create(NodeKey::tag(tag_id)?).await
    }

    pub async fn create_project(&self, project_id: &str) -> Result<()> {
        self.create(NodeKey::project(project_id)?).await
    }

    pub async fn delete_person(&self, person_id: &str) -> Result<()> {
        self.delete(NodeKey::person(person_id)?).await
    }

    pub async fn delete_tag(&self, tag_id: &str) -> Result<()> {
        self.delete(NodeKey::tag(tag_id)?).await
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.delete(NodeKey::project(project_id)?).await
    }

    // ── Relationships ────────────────────────────────────────────

    pub async fn link_project_tag(&self, project_id: &str, tag_id: &str) -> Result<()> {
        self.link(
            EdgeKind::HasTag,
            NodeKey::project(project_id)?,
            NodeKey::tag(tag_id)?,
        )
        .await
    }

    pub async fn unlink_project_tag(&self, project_id: &str, tag_id: &str) -> Result<()> {
        self.unlink(
            EdgeKind::HasTag,
            NodeKey::project(project_id)?,
            NodeKey::tag(tag_id)?,
        )
        .await
    }

    pub async fn link_person_tag(&self, person_id: &str, tag_id: &str) -> Result<()> {
        self.link(
            EdgeKind::HasTag,
            NodeKey::person(person_id)?,
            NodeKey::tag(tag_id)?,
        )
        .await
    }

    pub async fn unlink_person_tag(&self, person_id: &str, tag_id: &str) -> Result<()> {
        self.unlink(
            EdgeKind::HasTag,
            NodeKey::person(person_id)?,
            NodeKey::tag(tag_id)?,
        )
        .await
    }

    pub async fn link_person_project(&self, person_id: &str, project_id: &str) -> Result<()> {
        self.link(
            EdgeKind::MemberOf,
            NodeKey::person(person_id)?,
            NodeKey::project(project_id)?,
        )
        .await
    }

    pub async fn unlink_person_project(&self, person_id: &str, project_id: &str) -> Result<()> {
        self.unlink(
            EdgeKind::MemberOf,
            NodeKey::person(person_id)?,
            NodeKey::project(project_id)?,
        )
        .await
    }

    // ── Helpers ──────────────────────────────────────────────────

    async fn create(&self, key: NodeKey) -> Result<()> {
        self.store.upsert_node(&key).await?;
        tracing::debug!(label = %key.label, id = %key.id, "Node merged");
        Ok(())
    }

    async fn delete(&self, key: NodeKey) -> Result<()> {
        self.store.delete_node(&key).await?;
        tracing::debug!(label = %key.label, id = %key.id, "Node deleted");
        Ok(())
    }

    async fn link(&self, kind: EdgeKind, from: NodeKey, to: NodeKey) -> Result<()> {
        let edge = EdgeKey::new(kind, from, to)?;

        for endpoint in [&edge.from, &edge.to] {
            if !self.store.node_exists(endpoint).await? {
                tracing::info!(edge = %edge, missing = %endpoint, "Link rejected");
                return Err(TagGraphError::not_found(endpoint.label, endpoint.id.clone()));
            }
        }

        // An endpoint deleted between the check and the write still
        // surfaces as NotFound.
        match self.store.upsert_edge(&edge).await {
            Ok(()) => {
                tracing::debug!(edge = %edge, "Edge merged");
                Ok(())
            }
            Err(GraphError::EndpointNotFound { label, id, .. }) => {
                tracing::info!(edge = %edge, "Link lost race with endpoint delete");
                Err(TagGraphError::not_found(label, id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn unlink(&self, kind: EdgeKind, from: NodeKey, to: NodeKey) -> Result<()> {
        let edge = EdgeKey::new(kind, from, to)?;
        self.store.delete_edge(&edge).await?;
        tracing::debug!(edge = %edge, "Edge deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taggraph_core::NodeLabel;
    use taggraph_graph::MemoryGraph;

    fn service() -> (Arc<MemoryGraph>, MutationService) {
        let graph = Arc::new(MemoryGraph::new());
        let service = MutationService::new(graph.clone());
        (graph, service)
    }

    #[tokio::test]
    async fn link_reports_first_missing_endpoint() {
        let (_, svc) = service();

        let err = svc.link_project_tag("ghost-project", "ghost-tag").await.unwrap_err();
        assert_eq!(err, TagGraphError::not_found(NodeLabel::Project, "ghost-project"));

        svc.create_project("ghost-project").await.unwrap();
        let err = svc.link_project_tag("ghost-project", "ghost-tag").await.unwrap_err();
        assert_eq!(err, TagGraphError::not_found(NodeLabel::Tag, "ghost-tag"));
    }

    #[tokio::test]
    async fn membership_checks_person_then_project() {
        let (_, svc) = service();
        svc.create_project("p1").await.unwrap();

        let err = svc.link_person_project("bob", "p1").await.unwrap_err();
        assert_eq!(err, TagGraphError::not_found(NodeLabel::Person, "bob"));
    }

    #[tokio::test]
    async fn unlink_tolerates_missing_entities() {
        let (_, svc) = service();
        svc.unlink_person_tag("nobody", "nothing").await.unwrap();
        svc.unlink_project_tag("nowhere", "nothing").await.unwrap();
        svc.unlink_person_project("nobody", "nowhere").await.unwrap();
    }

    #[tokio::test]
    async fn empty_ids_are_invalid() {
        let (_, svc) = service();
        assert!(matches!(
            svc.create_tag("").await,
            Err(TagGraphError::InvalidArgument(_))
        ));
        assert!(matches!(
            svc.link_person_tag("alice", "").await,
            Err(TagGraphError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn unlink_removes_only_the_edge() {
        let (graph, svc) = service();
        svc.create_person("alice").await.unwrap();
        svc.create_tag("rust").await.unwrap();
        svc.link_person_tag("alice", "rust").await.unwrap();
        assert_eq!(graph.edge_count().await, 1);

        svc.unlink_person_tag("alice", "rust").await.unwrap();
        assert_eq!(graph.edge_count().await, 0);
        assert!(graph.node_exists(&NodeKey::person("alice").unwrap()).await.unwrap());
        assert!(graph.node_exists(&NodeKey::tag("rust").unwrap()).await.unwrap());
    }
}
