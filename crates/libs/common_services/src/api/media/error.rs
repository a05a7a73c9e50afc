use crate::collaborators::ObjectStoreError;
use crate::database::DbError;
use crate::imaging::ImageError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Media item not found: {0}")]
    MediaNotFound(String),

    #[error("Object storage error: {0}")]
    Storage(ObjectStoreError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<ImageError> for MediaError {
    fn from(err: ImageError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<ObjectStoreError> for MediaError {
    fn from(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::InvalidKey(key) => Self::BadRequest(format!("Invalid media path: {key}")),
            ObjectStoreError::Io(_) => Self::Storage(err),
        }
    }
}

fn log_error(error: &MediaError) {
    match error {
        MediaError::BadRequest(message) => warn!("Media -> Bad request: {}", message),
        MediaError::PersonNotFound(id) => warn!("Media -> Person not found: {}", id),
        MediaError::MediaNotFound(id) => warn!("Media -> Media item not found: {}", id),
        MediaError::Storage(e) => error!("Media -> Object storage failed: {}", e),
        MediaError::Database(e) => error!("Media -> Database failed: {}", e),
    }
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::PersonNotFound(id) => (StatusCode::NOT_FOUND, format!("Person not found: {id}")),
            Self::MediaNotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Media item not found: {id}"),
            ),
            Self::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Photo storage is unavailable.".to_string(),
            ),
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
