use crate::collaborators::{ObjectStoreError, PresignError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Access denied: {0}")]
    Forbidden(#[from] PresignError),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object storage error: {0}")]
    Storage(#[from] ObjectStoreError),
}

fn log_error(error: &StorageError) {
    match error {
        StorageError::Forbidden(e) => warn!("Storage -> Rejected link: {}", e),
        StorageError::NotFound(key) => warn!("Storage -> Object not found: {}", key),
        StorageError::Storage(e) => error!("Storage -> Read failed: {}", e),
    }
}

impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Forbidden(e) => (StatusCode::FORBIDDEN, e.to_string()),
            Self::NotFound(key) => (StatusCode::NOT_FOUND, format!("Object not found: {key}")),
            Self::Storage(ObjectStoreError::InvalidKey(key)) => {
                (StatusCode::BAD_REQUEST, format!("Invalid object key: {key}"))
            }
            Self::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Photo storage is unavailable.".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
