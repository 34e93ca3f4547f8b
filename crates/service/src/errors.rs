use models::errors::{ModelError, ValidationErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn store(err: impl std::fmt::Display) -> Self { Self::Store(err.to_string()) }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(e) => Self::Validation(e),
            ModelError::Db(msg) => Self::Store(msg),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(err: sea_orm::DbErr) -> Self { Self::Store(err.to_string()) }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self { Self::Store(err.to_string()) }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self { Self::Store(err.to_string()) }
}
