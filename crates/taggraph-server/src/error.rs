//! Mapping of service failures onto HTTP responses.
//!
//! `NotFound` and `InvalidArgument` are rejections the caller can fix;
//! `StoreUnavailable` is a distinct "try again" signal and is never folded
//! into the same status.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

use taggraph_core::TagGraphError;

/// A failed request: the underlying error plus the identifiers it concerned.
#[derive(Debug)]
pub struct ApiError {
    pub error: TagGraphError,
    ids: Map<String, Value>,
}

impl ApiError {
    pub fn new(error: TagGraphError, ids: &[(&str, &str)]) -> Self {
        Self {
            error,
            ids: id_map(ids),
        }
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            TagGraphError::NotFound { .. } | TagGraphError::EndpointNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            TagGraphError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            TagGraphError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut error = json!({
            "kind": self.error.kind(),
            "message": self.error.to_string(),
        });
        if let TagGraphError::NotFound { label, id }
        | TagGraphError::EndpointNotFound { label, id, .. } = &self.error
        {
            error["label"] = json!(label.as_str());
            error["id"] = json!(id);
        }

        let mut body = self.ids;
        body.insert("response".to_string(), Value::Bool(false));
        body.insert("error".to_string(), error);

        if self.error.is_retryable() {
            tracing::warn!(error = %self.error, "Store unavailable");
            (status, [(header::RETRY_AFTER, "1")], Json(Value::Object(body))).into_response()
        } else {
            (status, Json(Value::Object(body))).into_response()
        }
    }
}

pub(crate) fn id_map(ids: &[(&str, &str)]) -> Map<String, Value> {
    ids.iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}
