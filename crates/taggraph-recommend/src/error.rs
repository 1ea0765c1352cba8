//! Error types for the taggraph-recommend crate.

pub use taggraph_core::TagGraphError;

pub type Result<T> = std::result::Result<T, TagGraphError>;
