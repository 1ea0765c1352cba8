use thiserror::Error;

use crate::types::{EdgeKind, NodeLabel};

/// Every failure the tag graph reports to its callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TagGraphError {
    /// A referenced entity does not exist where existence is required.
    #[error("{label} {id} does not exist")]
    NotFound { label: NodeLabel, id: String },

    /// The store refused an edge because one endpoint is absent.
    #[error("cannot create {kind} edge: {label} {id} does not exist")]
    EndpointNotFound {
        kind: EdgeKind,
        label: NodeLabel,
        id: String,
    },

    /// The backing store failed for reasons unrelated to graph logic.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TagGraphError {
    pub fn not_found(label: NodeLabel, id: impl Into<String>) -> Self {
        Self::NotFound {
            label,
            id: id.into(),
        }
    }

    /// Stable machine-readable code for this kind of failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::EndpointNotFound { .. } => "endpoint_not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::InvalidArgument(_) => "invalid_argument",
        }
    }

    /// Only infrastructure failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            TagGraphError::not_found(NodeLabel::Person, "a"),
            TagGraphError::EndpointNotFound {
                kind: EdgeKind::HasTag,
                label: NodeLabel::Tag,
                id: "t".to_string(),
            },
            TagGraphError::StoreUnavailable("connection reset".to_string()),
            TagGraphError::InvalidArgument("limit must be non-negative".to_string()),
        ];
        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), 4);
    }

    #[test]
    fn only_store_unavailable_is_retryable() {
        assert!(TagGraphError::StoreUnavailable("down".into()).is_retryable());
        assert!(!TagGraphError::not_found(NodeLabel::Project, "p").is_retryable());
        assert!(!TagGraphError::InvalidArgument("x".into()).is_retryable());
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = TagGraphError::not_found(NodeLabel::Project, "ghost-project");
        assert_eq!(err.to_string(), "Project ghost-project does not exist");
    }
}
