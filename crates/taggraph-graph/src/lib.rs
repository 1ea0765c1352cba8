//! taggraph-graph: the graph store behind taggraph.
//!
//! This crate is the single mutation point for the graph. It defines the
//! `GraphStore` trait and two backends: a Neo4j client (`GraphClient`) and a
//! process-local `MemoryGraph`.

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::MemoryGraph;
pub use store::{GraphStore, OverlapSnapshot, TagMatches};
