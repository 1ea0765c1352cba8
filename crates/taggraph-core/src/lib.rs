//! taggraph-core: Shared schema types and error handling for taggraph.
//!
//! This crate provides the foundational types used across all taggraph crates:
//! - Node labels (Person, Tag, Project) and node keys
//! - Edge kinds (has_tag, member_of) and their endpoint rules
//! - The recommendation record returned to callers
//! - The error taxonomy every operation reports through

pub mod error;
pub mod types;

pub use error::TagGraphError;
pub use types::{EdgeKey, EdgeKind, NodeKey, NodeLabel, Recommendation};
