use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use models::LeakRequest;
use serde_json::{json, Value};
use service::errors::ServiceError;
use tracing::error;
use uuid::Uuid;

use super::{body_or_null, AppState};
use crate::errors::JsonApiError;

#[utoipa::path(
    get, path = "/api/requests", tag = "requests",
    responses((status = 200, description = "Leak requests, newest first", body = [crate::openapi::LeakRequestDoc]))
)]
pub async fn list(State(state): State<AppState>) -> Json<Vec<LeakRequest>> {
    match state.requests.list_requests().await {
        Ok(items) => Json(items),
        Err(e) => {
            error!(error = %e, "listing requests failed; returning empty list");
            Json(Vec::new())
        }
    }
}

#[utoipa::path(
    post, path = "/api/requests", tag = "requests",
    request_body = crate::openapi::CreateLeakRequestDoc,
    responses(
        (status = 200, description = "Created", body = crate::openapi::RequestItemDoc),
        (status = 400, description = "Invalid body", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Failed to create", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, JsonApiError> {
    let body = body_or_null(body);
    let item = state
        .requests
        .create_request(&body)
        .await
        .map_err(|e| JsonApiError::from_service(e, "Invalid body", "Failed to create"))?;
    Ok(Json(json!({"success": true, "item": item})))
}

#[utoipa::path(
    post, path = "/api/requests/{id}/like", tag = "requests",
    params(("id" = String, Path, description = "Leak request id")),
    responses(
        (status = 200, description = "Liked", body = crate::openapi::RequestItemDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Failed to like", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn like(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, JsonApiError> {
    // A malformed id cannot name any record.
    let Ok(id) = Uuid::parse_str(&id) else {
        return Err(JsonApiError::not_found());
    };
    match state.requests.like_request(id).await {
        Ok(item) => Ok(Json(json!({"success": true, "item": item}))),
        Err(ServiceError::NotFound(_)) => Err(JsonApiError::not_found()),
        Err(e) => {
            error!(%id, error = %e, "like failed");
            Err(JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to like", None))
        }
    }
}
