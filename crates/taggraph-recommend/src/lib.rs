//! taggraph-recommend: mutations and recommendations over the tag graph.
//!
//! `MutationService` enforces the existence preconditions for relationship
//! changes; `RecommendationEngine` ranks non-member persons for a project by
//! the number of tags they share with it. Both take the store as an
//! explicitly passed `Arc<dyn GraphStore>`.

pub mod engine;
pub mod error;
pub mod mutation;
pub mod ranking;

pub use engine::{RecommendationEngine, DEFAULT_LIMIT};
pub use error::Result;
pub use mutation::MutationService;
pub use ranking::rank_candidates;
