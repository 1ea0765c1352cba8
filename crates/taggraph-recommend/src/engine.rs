//! Recommendation engine: who should join a project, by shared tags.

use std::sync::Arc;

use taggraph_core::types::validate_id;
use taggraph_core::{NodeLabel, Recommendation, TagGraphError};
use taggraph_graph::GraphStore;

use crate::error::Result;
use crate::ranking::rank_candidates;

/// Number of recommendations returned when the caller does not ask for a
/// specific count.
pub const DEFAULT_LIMIT: usize = 50;

/// Read-only recommendation queries over the graph store.
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn GraphStore>,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Recommend up to `limit` non-member persons for the project.
    ///
    /// Fails with `NotFound` for an unknown project and `InvalidArgument`
    /// for a negative limit. A project without tags yields an empty list.
    pub async fn recommend(&self, project_id: &str, limit: i64) -> Result<Vec<Recommendation>> {
        validate_id(NodeLabel::Project, project_id)?;
        let limit = usize::try_from(limit).map_err(|_| {
            TagGraphError::InvalidArgument(format!("limit must be non-negative, got {limit}"))
        })?;

        let snapshot = self
            .store
            .overlap_snapshot(project_id)
            .await?
            .ok_or_else(|| TagGraphError::not_found(NodeLabel::Project, project_id))?;

        if snapshot.project_tags.is_empty() {
            tracing::debug!(project_id, "Project has no tags, nothing to recommend");
            return Ok(Vec::new());
        }

        let candidate_count = snapshot.candidates.len();
        let ranked = rank_candidates(snapshot, limit);

        tracing::info!(
            project_id,
            limit,
            candidates = candidate_count,
            returned = ranked.len(),
            "Recommendations computed"
        );

        Ok(ranked)
    }
}
