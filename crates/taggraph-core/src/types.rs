//! Schema types for the tag graph.
//!
//! Three node labels (Person, Tag, Project) joined by two relationship
//! kinds (`has_tag`, `member_of`). Nodes are identified by `(label, id)`,
//! edges by `(kind, from, to)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TagGraphError;

// ── Node Labels ───────────────────────────────────────────────────

/// The label of a node in the graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeLabel {
    Person,
    Tag,
    Project,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 3] = [NodeLabel::Person, NodeLabel::Tag, NodeLabel::Project];

    /// Label name as stored in the graph engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Tag => "Tag",
            Self::Project => "Project",
        }
    }

    /// Property that holds the node's unique id.
    pub fn id_property(&self) -> &'static str {
        match self {
            Self::Person => "person_id",
            Self::Tag => "tag_id",
            Self::Project => "project_id",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Edge Kinds ────────────────────────────────────────────────────

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Person or Project → Tag.
    HasTag,
    /// Person → Project.
    MemberOf,
}

impl EdgeKind {
    /// Relationship type name as stored in the graph engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasTag => "has_tag",
            Self::MemberOf => "member_of",
        }
    }

    /// Whether an edge of this kind may connect `from` to `to`.
    pub fn accepts(&self, from: NodeLabel, to: NodeLabel) -> bool {
        match self {
            Self::HasTag => {
                matches!(from, NodeLabel::Person | NodeLabel::Project) && to == NodeLabel::Tag
            }
            Self::MemberOf => from == NodeLabel::Person && to == NodeLabel::Project,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Keys ──────────────────────────────────────────────────────────

/// Identity of a node: its label plus an opaque string id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub label: NodeLabel,
    pub id: String,
}

impl NodeKey {
    /// Build a key, rejecting malformed ids.
    pub fn new(label: NodeLabel, id: impl Into<String>) -> Result<Self, TagGraphError> {
        let id = id.into();
        validate_id(label, &id)?;
        Ok(Self { label, id })
    }

    pub fn person(id: impl Into<String>) -> Result<Self, TagGraphError> {
        Self::new(NodeLabel::Person, id)
    }

    pub fn tag(id: impl Into<String>) -> Result<Self, TagGraphError> {
        Self::new(NodeLabel::Tag, id)
    }

    pub fn project(id: impl Into<String>) -> Result<Self, TagGraphError> {
        Self::new(NodeLabel::Project, id)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label, self.id)
    }
}

/// Identity of an edge. At most one edge exists per key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub kind: EdgeKind,
    pub from: NodeKey,
    pub to: NodeKey,
}

impl EdgeKey {
    /// Build an edge key, rejecting label pairs the edge kind does not allow.
    pub fn new(kind: EdgeKind, from: NodeKey, to: NodeKey) -> Result<Self, TagGraphError> {
        if !kind.accepts(from.label, to.label) {
            return Err(TagGraphError::InvalidArgument(format!(
                "{kind} cannot connect {} to {}",
                from.label, to.label
            )));
        }
        Ok(Self { kind, from, to })
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-[{}]->{}", self.from, self.kind, self.to)
    }
}

/// Ids are opaque, but the empty string is never a valid id.
pub fn validate_id(label: NodeLabel, id: &str) -> Result<(), TagGraphError> {
    if id.is_empty() {
        return Err(TagGraphError::InvalidArgument(format!(
            "{} must not be empty",
            label.id_property()
        )));
    }
    Ok(())
}

// ── Recommendations ───────────────────────────────────────────────

/// A person suggested for a project, ranked by tag overlap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub person_id: String,
    pub shared_tag_count: usize,
    /// Tags shared with the project, ascending.
    pub shared_tag_ids: Vec<String>,
}
