//! In-memory graph store.
//!
//! A single `RwLock` guards the whole graph: every mutation is serialized
//! behind the write lock, and reads (including the overlap snapshot) see
//! one consistent state under the read lock.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use taggraph_core::{EdgeKey, EdgeKind, NodeKey, NodeLabel};

use crate::client::GraphError;
use crate::mutations::check_edge_labels;
use crate::store::{GraphStore, OverlapSnapshot, TagMatches};

type Adjacency = HashMap<NodeKey, BTreeSet<(EdgeKind, NodeKey)>>;

#[derive(Debug, Default)]
struct GraphState {
    nodes: HashMap<NodeLabel, HashSet<String>>,
    /// `outgoing[a]` holds `(kind, b)` for every edge `a -[kind]-> b`.
    outgoing: Adjacency,
    /// Mirror of `outgoing` keyed by target.
    incoming: Adjacency,
}

impl GraphState {
    fn contains(&self, key: &NodeKey) -> bool {
        self.nodes
            .get(&key.label)
            .is_some_and(|ids| ids.contains(&key.id))
    }

    fn insert_node(&mut self, key: &NodeKey) -> bool {
        self.nodes
            .entry(key.label)
            .or_default()
            .insert(key.id.clone())
    }

    /// Remove the node and all incident edges. Returns the number of
    /// edges removed, or `None` if the node was absent.
    fn detach_delete(&mut self, key: &NodeKey) -> Option<usize> {
        let removed = self
            .nodes
            .get_mut(&key.label)
            .is_some_and(|ids| ids.remove(&key.id));
        if !removed {
            return None;
        }

        let mut edges = 0;
        if let Some(out) = self.outgoing.remove(key) {
            for (kind, target) in out {
                unlink(&mut self.incoming, &target, &(kind, key.clone()));
                edges += 1;
            }
        }
        if let Some(inc) = self.incoming.remove(key) {
            for (kind, source) in inc {
                unlink(&mut self.outgoing, &source, &(kind, key.clone()));
                edges += 1;
            }
        }
        Some(edges)
    }

    fn has_edge(&self, edge: &EdgeKey) -> bool {
        self.outgoing
            .get(&edge.from)
            .is_some_and(|out| out.contains(&(edge.kind, edge.to.clone())))
    }

    fn insert_edge(&mut self, edge: &EdgeKey) -> bool {
        let inserted = self
            .outgoing
            .entry(edge.from.clone())
            .or_default()
            .insert((edge.kind, edge.to.clone()));
        self.incoming
            .entry(edge.to.clone())
            .or_default()
            .insert((edge.kind, edge.from.clone()));
        inserted
    }

    fn remove_edge(&mut self, edge: &EdgeKey) -> bool {
        let removed = unlink(&mut self.outgoing, &edge.from, &(edge.kind, edge.to.clone()));
        unlink(&mut self.incoming, &edge.to, &(edge.kind, edge.from.clone()));
        removed
    }

    fn tags_of(&self, key: &NodeKey) -> BTreeSet<String> {
        self.outgoing
            .get(key)
            .map(|out| {
                out.iter()
                    .filter(|(kind, _)| *kind == EdgeKind::HasTag)
                    .map(|(_, tag)| tag.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn members_of(&self, project_id: &str) -> BTreeSet<String> {
        let project = NodeKey {
            label: NodeLabel::Project,
            id: project_id.to_string(),
        };
        self.incoming
            .get(&project)
            .map(|inc| {
                inc.iter()
                    .filter(|(kind, source)| {
                        *kind == EdgeKind::MemberOf && source.label == NodeLabel::Person
                    })
                    .map(|(_, person)| person.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn persons_with_any_tag(&self, tag_ids: &BTreeSet<String>) -> TagMatches {
        let mut matches = TagMatches::new();
        for tag_id in tag_ids {
            let tag = NodeKey {
                label: NodeLabel::Tag,
                id: tag_id.clone(),
            };
            let Some(inc) = self.incoming.get(&tag) else {
                continue;
            };
            for (kind, source) in inc {
                if *kind == EdgeKind::HasTag && source.label == NodeLabel::Person {
                    matches
                        .entry(source.id.clone())
                        .or_default()
                        .insert(tag_id.clone());
                }
            }
        }
        matches
    }
}

/// Remove `entry` from `map[key]`, dropping the set once it is empty.
fn unlink(map: &mut Adjacency, key: &NodeKey, entry: &(EdgeKind, NodeKey)) -> bool {
    let Some(set) = map.get_mut(key) else {
        return false;
    };
    let removed = set.remove(entry);
    if set.is_empty() {
        map.remove(key);
    }
    removed
}

/// Process-local graph store. Contents live for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of edges currently stored.
    pub async fn edge_count(&self) -> usize {
        let state = self.state.read().await;
        state.outgoing.values().map(BTreeSet::len).sum()
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn node_exists(&self, key: &NodeKey) -> Result<bool, GraphError> {
        Ok(self.state.read().await.contains(key))
    }

    async fn upsert_node(&self, key: &NodeKey) -> Result<(), GraphError> {
        if self.state.write().await.insert_node(key) {
            tracing::debug!(node = %key, "Node created");
        }
        Ok(())
    }

    async fn delete_node(&self, key: &NodeKey) -> Result<(), GraphError> {
        if let Some(edges) = self.state.write().await.detach_delete(key) {
            tracing::debug!(node = %key, edges, "Node detach-deleted");
        }
        Ok(())
    }

    async fn upsert_edge(&self, edge: &EdgeKey) -> Result<(), GraphError> {
        check_edge_labels(edge)?;

        let mut state = self.state.write().await;
        for endpoint in [&edge.from, &edge.to] {
            if !state.contains(endpoint) {
                return Err(GraphError::EndpointNotFound {
                    kind: edge.kind,
                    label: endpoint.label,
                    id: endpoint.id.clone(),
                });
            }
        }
        if state.insert_edge(edge) {
            tracing::debug!(edge = %edge, "Edge created");
        }
        Ok(())
    }

    async fn delete_edge(&self, edge: &EdgeKey) -> Result<(), GraphError> {
        check_edge_labels(edge)?;

        if self.state.write().await.remove_edge(edge) {
            tracing::debug!(edge = %edge, "Edge deleted");
        }
        Ok(())
    }

    async fn edge_exists(&self, edge: &EdgeKey) -> Result<bool, GraphError> {
        check_edge_labels(edge)?;
        Ok(self.state.read().await.has_edge(edge))
    }

    async fn tags_of(&self, key: &NodeKey) -> Result<BTreeSet<String>, GraphError> {
        Ok(self.state.read().await.tags_of(key))
    }

    async fn persons_with_any_tag(
        &self,
        tag_ids: &BTreeSet<String>,
    ) -> Result<TagMatches, GraphError> {
        Ok(self.state.read().await.persons_with_any_tag(tag_ids))
    }

    async fn members_of(&self, project_id: &str) -> Result<BTreeSet<String>, GraphError> {
        Ok(self.state.read().await.members_of(project_id))
    }

    async fn count_nodes(&self, label: NodeLabel) -> Result<u64, GraphError> {
        let state = self.state.read().await;
        Ok(state.nodes.get(&label).map_or(0, HashSet::len) as u64)
    }

    async fn ping(&self) -> Result<(), GraphError> {
        Ok(())
    }

    async fn overlap_snapshot(
        &self,
        project_id: &str,
    ) -> Result<Option<OverlapSnapshot>, GraphError> {
        let state = self.state.read().await;
        let project = NodeKey {
            label: NodeLabel::Project,
            id: project_id.to_string(),
        };
        if !state.contains(&project) {
            return Ok(None);
        }

        let project_tags = state.tags_of(&project);
        let members = state.members_of(project_id);
        let candidates = state.persons_with_any_tag(&project_tags);

        Ok(Some(OverlapSnapshot {
            project_tags,
            members,
            candidates,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str) -> NodeKey {
        NodeKey::person(id).unwrap()
    }

    fn tag(id: &str) -> NodeKey {
        NodeKey::tag(id).unwrap()
    }

    fn project(id: &str) -> NodeKey {
        NodeKey::project(id).unwrap()
    }

    fn has_tag(from: NodeKey, to: NodeKey) -> EdgeKey {
        EdgeKey::new(EdgeKind::HasTag, from, to).unwrap()
    }

    fn member_of(from: NodeKey, to: NodeKey) -> EdgeKey {
        EdgeKey::new(EdgeKind::MemberOf, from, to).unwrap()
    }

    #[tokio::test]
    async fn upsert_node_is_idempotent() {
        let graph = MemoryGraph::new();
        graph.upsert_node(&person("alice")).await.unwrap();
        graph.upsert_node(&person("alice")).await.unwrap();

        assert!(graph.node_exists(&person("alice")).await.unwrap());
        assert_eq!(graph.count_nodes(NodeLabel::Person).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn same_id_under_different_labels_are_distinct() {
        let graph = MemoryGraph::new();
        graph.upsert_node(&person("x")).await.unwrap();

        assert!(!graph.node_exists(&tag("x")).await.unwrap());
        assert!(!graph.node_exists(&project("x")).await.unwrap());
    }

    #[tokio::test]
    async fn upsert_edge_requires_both_endpoints() {
        let graph = MemoryGraph::new();
        graph.upsert_node(&person("alice")).await.unwrap();

        let err = graph
            .upsert_edge(&has_tag(person("alice"), tag("rust")))
            .await
            .unwrap_err();
        match err {
            GraphError::EndpointNotFound { label, id, .. } => {
                assert_eq!(label, NodeLabel::Tag);
                assert_eq!(id, "rust");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(graph.edge_count().await, 0);
    }

    #[tokio::test]
    async fn upsert_edge_is_idempotent() {
        let graph = MemoryGraph::new();
        graph.upsert_node(&person("alice")).await.unwrap();
        graph.upsert_node(&tag("rust")).await.unwrap();

        let edge = has_tag(person("alice"), tag("rust"));
        graph.upsert_edge(&edge).await.unwrap();
        graph.upsert_edge(&edge).await.unwrap();

        assert_eq!(graph.edge_count().await, 1);
        assert!(graph.edge_exists(&edge).await.unwrap());
    }

    #[tokio::test]
    async fn mislabeled_edge_rejected() {
        let graph = MemoryGraph::new();
        let edge = EdgeKey {
            kind: EdgeKind::MemberOf,
            from: tag("rust"),
            to: project("p1"),
        };
        let err = graph.upsert_edge(&edge).await.unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn delete_node_detaches_edges_both_directions() {
        let graph = MemoryGraph::new();
        for key in [person("alice"), tag("rust"), project("p1")] {
            graph.upsert_node(&key).await.unwrap();
        }
        graph
            .upsert_edge(&has_tag(person("alice"), tag("rust")))
            .await
            .unwrap();
        graph
            .upsert_edge(&has_tag(project("p1"), tag("rust")))
            .await
            .unwrap();
        graph
            .upsert_edge(&member_of(person("alice"), project("p1")))
            .await
            .unwrap();
        assert_eq!(graph.edge_count().await, 3);

        // Tag has only incoming edges.
        graph.delete_node(&tag("rust")).await.unwrap();
        assert_eq!(graph.edge_count().await, 1);
        assert!(graph.tags_of(&person("alice")).await.unwrap().is_empty());

        // Person has only outgoing edges.
        graph.delete_node(&person("alice")).await.unwrap();
        assert_eq!(graph.edge_count().await, 0);
        assert!(graph.members_of("p1").await.unwrap().is_empty());
        assert!(graph.node_exists(&project("p1")).await.unwrap());
    }

    #[tokio::test]
    async fn delete_missing_node_and_edge_are_noops() {
        let graph = MemoryGraph::new();
        graph.delete_node(&person("ghost")).await.unwrap();
        graph
            .delete_edge(&has_tag(person("ghost"), tag("ghost")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn persons_with_any_tag_ignores_projects() {
        let graph = MemoryGraph::new();
        for key in [person("a"), person("b"), project("p1"), tag("t1"), tag("t2")] {
            graph.upsert_node(&key).await.unwrap();
        }
        graph.upsert_edge(&has_tag(person("a"), tag("t1"))).await.unwrap();
        graph.upsert_edge(&has_tag(person("b"), tag("t1"))).await.unwrap();
        graph.upsert_edge(&has_tag(person("b"), tag("t2"))).await.unwrap();
        graph.upsert_edge(&has_tag(project("p1"), tag("t1"))).await.unwrap();

        let wanted: BTreeSet<String> = ["t1", "t2", "t3"].iter().map(|s| s.to_string()).collect();
        let matches = graph.persons_with_any_tag(&wanted).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches["a"].len(), 1);
        assert_eq!(matches["b"].len(), 2);
        assert!(!matches.contains_key("p1"));
    }

    #[tokio::test]
    async fn overlap_snapshot_for_missing_project_is_none() {
        let graph = MemoryGraph::new();
        assert!(graph.overlap_snapshot("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overlap_snapshot_matches_default_composition() {
        struct Composed<'a>(&'a MemoryGraph);

        #[async_trait]
        impl GraphStore for Composed<'_> {
            async fn node_exists(&self, key: &NodeKey) -> Result<bool, GraphError> {
                self.0.node_exists(key).await
            }
            async fn upsert_node(&self, key: &NodeKey) -> Result<(), GraphError> {
                self.0.upsert_node(key).await
            }
            async fn delete_node(&self, key: &NodeKey) -> Result<(), GraphError> {
                self.0.delete_node(key).await
            }
            async fn upsert_edge(&self, edge: &EdgeKey) -> Result<(), GraphError> {
                self.0.upsert_edge(edge).await
            }
            async fn delete_edge(&self, edge: &EdgeKey) -> Result<(), GraphError> {
                self.0.delete_edge(edge).await
            }
            async fn edge_exists(&self, edge: &EdgeKey) -> Result<bool, GraphError> {
                self.0.edge_exists(edge).await
            }
            async fn tags_of(&self, key: &NodeKey) -> Result<BTreeSet<String>, GraphError> {
                self.0.tags_of(key).await
            }
            async fn persons_with_any_tag(
                &self,
                tag_ids: &BTreeSet<String>,
            ) -> Result<TagMatches, GraphError> {
                self.0.persons_with_any_tag(tag_ids).await
            }
            async fn members_of(&self, project_id: &str) -> Result<BTreeSet<String>, GraphError> {
                self.0.members_of(project_id).await
            }
            async fn count_nodes(&self, label: NodeLabel) -> Result<u64, GraphError> {
                self.0.count_nodes(label).await
            }
            async fn ping(&self) -> Result<(), GraphError> {
                Ok(())
            }
        }

        let graph = MemoryGraph::new();
        for key in [person("a"), person("c"), project("p1"), tag("t1")] {
            graph.upsert_node(&key).await.unwrap();
        }
        graph.upsert_edge(&has_tag(project("p1"), tag("t1"))).await.unwrap();
        graph.upsert_edge(&has_tag(person("a"), tag("t1"))).await.unwrap();
        graph.upsert_edge(&has_tag(person("c"), tag("t1"))).await.unwrap();
        graph
            .upsert_edge(&member_of(person("c"), project("p1")))
            .await
            .unwrap();

        let direct = graph.overlap_snapshot("p1").await.unwrap().unwrap();
        let composed = Composed(&graph).overlap_snapshot("p1").await.unwrap().unwrap();
        assert_eq!(direct, composed);
        assert_eq!(direct.members.len(), 1);
        assert_eq!(direct.candidates.len(), 2);
    }
}
