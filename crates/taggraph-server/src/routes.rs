//! HTTP routes for the tag graph.
//!
//! Each mutation route is a thin translation onto `MutationService`; `PUT`
//! creates, `DELETE` removes, and both are idempotent.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use taggraph_core::{NodeLabel, TagGraphError};
use taggraph_graph::{GraphError, GraphStore};
use taggraph_recommend::{MutationService, RecommendationEngine};

use crate::error::{id_map, ApiError};

type ApiResult = Result<Json<Value>, ApiError>;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub mutations: MutationService,
    pub engine: RecommendationEngine,
    pub store: Arc<dyn GraphStore>,
    pub default_limit: usize,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn GraphStore>, default_limit: usize) -> Self {
        Self {
            mutations: MutationService::new(store.clone()),
            engine: RecommendationEngine::new(store.clone()),
            store,
            default_limit,
            started_at: Utc::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/persons/:person_id", put(create_person).delete(delete_person))
        .route("/tags/:tag_id", put(create_tag).delete(delete_tag))
        .route("/projects/:project_id", put(create_project).delete(delete_project))
        .route(
            "/projects/:project_id/tags/:tag_id",
            put(link_project_tag).delete(unlink_project_tag),
        )
        .route(
            "/persons/:person_id/tags/:tag_id",
            put(link_person_tag).delete(unlink_person_tag),
        )
        .route(
            "/projects/:project_id/members/:person_id",
            put(link_member).delete(unlink_member),
        )
        .route(
            "/projects/:project_id/recommendations",
            get(recommendations),
        )
        .route("/health", get(health))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    request_id = %Uuid::new_v4(),
                    method = %req.method(),
                    uri = %req.uri(),
                )
            }),
        )
        .with_state(state)
}

fn accepted(action: &str, ids: &[(&str, &str)]) -> Json<Value> {
    let mut body = id_map(ids);
    body.insert("response".to_string(), Value::Bool(true));
    body.insert("action".to_string(), Value::String(action.to_string()));
    Json(Value::Object(body))
}

// ---- Nodes ----

async fn create_person(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> ApiResult {
    let ids = [("person_id", person_id.as_str())];
    state
        .mutations
        .create_person(&person_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("create", &ids))
}

async fn delete_person(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> ApiResult {
    let ids = [("person_id", person_id.as_str())];
    state
        .mutations
        .delete_person(&person_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("delete", &ids))
}

async fn create_tag(State(state): State<AppState>, Path(tag_id): Path<String>) -> ApiResult {
    let ids = [("tag_id", tag_id.as_str())];
    state
        .mutations
        .create_tag(&tag_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("create", &ids))
}

async fn delete_tag(State(state): State<AppState>, Path(tag_id): Path<String>) -> ApiResult {
    let ids = [("tag_id", tag_id.as_str())];
    state
        .mutations
        .delete_tag(&tag_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("delete", &ids))
}

async fn create_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult {
    let ids = [("project_id", project_id.as_str())];
    state
        .mutations
        .create_project(&project_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("create", &ids))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult {
    let ids = [("project_id", project_id.as_str())];
    state
        .mutations
        .delete_project(&project_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("delete", &ids))
}

// ---- Relationships ----

async fn link_project_tag(
    State(state): State<AppState>,
    Path((project_id, tag_id)): Path<(String, String)>,
) -> ApiResult {
    let ids = [("project_id", project_id.as_str()), ("tag_id", tag_id.as_str())];
    state
        .mutations
        .link_project_tag(&project_id, &tag_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("create", &ids))
}

async fn unlink_project_tag(
    State(state): State<AppState>,
    Path((project_id, tag_id)): Path<(String, String)>,
) -> ApiResult {
    let ids = [("project_id", project_id.as_str()), ("tag_id", tag_id.as_str())];
    state
        .mutations
        .unlink_project_tag(&project_id, &tag_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("delete", &ids))
}

async fn link_person_tag(
    State(state): State<AppState>,
    Path((person_id, tag_id)): Path<(String, String)>,
) -> ApiResult {
    let ids = [("person_id", person_id.as_str()), ("tag_id", tag_id.as_str())];
    state
        .mutations
        .link_person_tag(&person_id, &tag_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("create", &ids))
}

async fn unlink_person_tag(
    State(state): State<AppState>,
    Path((person_id, tag_id)): Path<(String, String)>,
) -> ApiResult {
    let ids = [("person_id", person_id.as_str()), ("tag_id", tag_id.as_str())];
    state
        .mutations
        .unlink_person_tag(&person_id, &tag_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("delete", &ids))
}

async fn link_member(
    State(state): State<AppState>,
    Path((project_id, person_id)): Path<(String, String)>,
) -> ApiResult {
    let ids = [("person_id", person_id.as_str()), ("project_id", project_id.as_str())];
    state
        .mutations
        .link_person_project(&person_id, &project_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("create", &ids))
}

async fn unlink_member(
    State(state): State<AppState>,
    Path((project_id, person_id)): Path<(String, String)>,
) -> ApiResult {
    let ids = [("person_id", person_id.as_str()), ("project_id", project_id.as_str())];
    state
        .mutations
        .unlink_person_project(&person_id, &project_id)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;
    Ok(accepted("delete", &ids))
}

// ---- Queries ----

#[derive(Debug, Deserialize)]
struct RecommendParams {
    limit: Option<String>,
}

async fn recommendations(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    params: Result<Query<RecommendParams>, QueryRejection>,
) -> ApiResult {
    let ids = [("project_id", project_id.as_str())];

    let Query(params) = params.map_err(|rejection| {
        ApiError::new(
            TagGraphError::InvalidArgument(rejection.body_text()),
            &ids,
        )
    })?;

    let limit = match params.limit.as_deref() {
        None => i64::try_from(state.default_limit).unwrap_or(i64::MAX),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
            ApiError::new(
                TagGraphError::InvalidArgument(format!("limit must be an integer, got {raw:?}")),
                &ids,
            )
        })?,
    };

    let recs = state
        .engine
        .recommend(&project_id, limit)
        .await
        .map_err(|e| ApiError::new(e, &ids))?;

    Ok(Json(json!({
        "response": true,
        "project_id": project_id,
        "recommendations": recs,
    })))
}

/// `UP` only when the store answers a ping and every per-label count.
async fn health(State(state): State<AppState>) -> Response {
    let started_at = state.started_at.to_rfc3339();

    match node_counts(state.store.as_ref()).await {
        Ok(nodes) => Json(json!({
            "status": "UP",
            "version": env!("CARGO_PKG_VERSION"),
            "started_at": started_at,
            "nodes": nodes,
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::RETRY_AFTER, "1")],
                Json(json!({
                    "status": "DOWN",
                    "started_at": started_at,
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn node_counts(store: &dyn GraphStore) -> Result<Map<String, Value>, GraphError> {
    store.ping().await?;

    let mut nodes = Map::new();
    for label in NodeLabel::ALL {
        let count = store.count_nodes(label).await?;
        nodes.insert(label.as_str().to_string(), json!(count));
    }
    Ok(nodes)
}
