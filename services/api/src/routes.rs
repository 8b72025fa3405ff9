use crate::definitions::definition_query;
use crate::infra::AppState;
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use process_runtime::error::AppError;
use process_runtime::model::{
    ApiProcessDefinitionConverter, ProcessDefinition, ProcessDefinitionConverter,
};
use process_runtime::repository::RepositoryService;
use serde::Deserialize;
use serde_json::json;
use std::io::Read;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DefinitionListParams {
    #[serde(default)]
    pub(crate) key: Option<String>,
    #[serde(default)]
    pub(crate) latest: bool,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/process-definitions", get(list_definitions_endpoint))
        .route(
            "/api/v1/process-definitions/:id/model",
            get(process_model_endpoint),
        )
        .route("/api/v1/deployments/events", get(deployed_events_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_definitions_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<DefinitionListParams>,
) -> Result<Json<Vec<ProcessDefinition>>, AppError> {
    let query = definition_query(params.key, params.latest);
    let entities = state.repository.list_process_definitions(&query)?;
    let definitions = ApiProcessDefinitionConverter.convert_all(&entities)?;
    Ok(Json(definitions))
}

pub(crate) async fn process_model_endpoint(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let mut content = String::new();
    state
        .repository
        .process_model(&id)?
        .read_to_string(&mut content)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        content,
    )
        .into_response())
}

pub(crate) async fn deployed_events_endpoint(Extension(state): Extension<AppState>) -> Response {
    match state.publisher.latest_deployed() {
        Some(deployed) => (StatusCode::OK, Json(deployed)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no deployed process definitions announced yet" })),
        )
            .into_response(),
    }
}
