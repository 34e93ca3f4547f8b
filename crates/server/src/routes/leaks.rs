use axum::{extract::rejection::JsonRejection, extract::State, Json};
use models::Leak;
use serde_json::{json, Value};
use tracing::error;

use super::{body_or_null, AppState};
use crate::errors::JsonApiError;

#[utoipa::path(
    post, path = "/api/publish", tag = "leaks",
    request_body = crate::openapi::PublishLeakDoc,
    responses(
        (status = 200, description = "Published", body = crate::openapi::PublishedDoc),
        (status = 400, description = "Invalid data", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Failed to publish", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn publish(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, JsonApiError> {
    let body = body_or_null(body);
    let leak = state
        .leaks
        .publish(&body)
        .await
        .map_err(|e| JsonApiError::from_service(e, "Invalid data", "Failed to publish"))?;
    Ok(Json(json!({"success": true, "leak": leak})))
}

#[utoipa::path(
    get, path = "/api/leaks", tag = "leaks",
    responses((status = 200, description = "Published leaks, newest first", body = [crate::openapi::LeakDoc]))
)]
pub async fn list(State(state): State<AppState>) -> Json<Vec<Leak>> {
    match state.leaks.list_published().await {
        Ok(leaks) => Json(leaks),
        Err(e) => {
            error!(error = %e, "listing leaks failed; returning empty list");
            Json(Vec::new())
        }
    }
}
