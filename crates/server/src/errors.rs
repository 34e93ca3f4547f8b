use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::FlattenedErrors;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// JSON error body: `{ "error": ..., "issues"?: ... }`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub issues: Option<FlattenedErrors>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, issues: Option<FlattenedErrors>) -> Self {
        Self { status, error: error.into(), issues }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found", None)
    }

    /// Map a service failure. `invalid` labels validation failures and
    /// `failed` labels store failures, which are logged here.
    pub fn from_service(err: ServiceError, invalid: &str, failed: &str) -> Self {
        match err {
            ServiceError::Validation(e) => Self::new(StatusCode::BAD_REQUEST, invalid, Some(e.flatten())),
            ServiceError::NotFound(_) => Self::not_found(),
            ServiceError::Store(msg) => {
                error!(error = %msg, "{failed}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, failed, None)
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = match self.issues {
            Some(issues) => serde_json::json!({"error": self.error, "issues": issues}),
            None => serde_json::json!({"error": self.error}),
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage unavailable: {0}")]
    Storage(String),
}
