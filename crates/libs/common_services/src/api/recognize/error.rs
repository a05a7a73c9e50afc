use crate::collaborators::FaceCollectionError;
use crate::database::DbError;
use crate::imaging::ImageError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Face service error: {0}")]
    FaceService(#[from] FaceCollectionError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

fn log_error(error: &RecognizeError) {
    match error {
        RecognizeError::Image(e) => warn!("Recognize -> Bad image: {}", e),
        RecognizeError::FaceService(e) => error!("Recognize -> Face service failed: {}", e),
        RecognizeError::Database(e) => error!("Recognize -> Record lookup failed: {}", e),
    }
}

impl IntoResponse for RecognizeError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Image(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::FaceService(FaceCollectionError::InvalidImage(message)) => (
                StatusCode::BAD_REQUEST,
                format!("Image rejected: {message}"),
            ),
            Self::FaceService(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Face recognition is unavailable.".to_string(),
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
