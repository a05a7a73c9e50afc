use super::interfaces::DeletionStep;
use crate::api::media::error::MediaError;
use crate::collaborators::{FaceCollectionError, ObjectStoreError};
use crate::database::DbError;
use crate::imaging::ImageError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum PeopleError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Person not found: {0}")]
    NotFound(String),

    #[error("No face detected")]
    NoFaceDetected,

    #[error("Face service error: {0}")]
    FaceService(#[from] FaceCollectionError),

    #[error("Object storage error: {0}")]
    Storage(#[from] ObjectStoreError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// A deletion step failed. The record is kept so repeating the delete finishes it.
    #[error("Deleting person {person_id} stopped at {failed_step:?}: {reason}")]
    DeletionIncomplete {
        person_id: String,
        completed_steps: Vec<DeletionStep>,
        failed_step: DeletionStep,
        reason: String,
    },
}

impl From<ImageError> for PeopleError {
    fn from(err: ImageError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<MediaError> for PeopleError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::BadRequest(message) => Self::BadRequest(message),
            MediaError::PersonNotFound(id) => Self::NotFound(id),
            MediaError::MediaNotFound(id) => Self::NotFound(id),
            MediaError::Storage(e) => Self::Storage(e),
            MediaError::Database(e) => Self::Database(e),
        }
    }
}

fn log_error(error: &PeopleError) {
    match error {
        PeopleError::BadRequest(message) => warn!("People -> Bad request: {}", message),
        PeopleError::NotFound(id) => warn!("People -> Person not found: {}", id),
        PeopleError::NoFaceDetected => warn!("People -> No face detected in enrollment photo"),
        PeopleError::FaceService(e) => error!("People -> Face service failed: {}", e),
        PeopleError::Storage(e) => error!("People -> Object storage failed: {}", e),
        PeopleError::Database(e) => error!("People -> Database failed: {}", e),
        PeopleError::DeletionIncomplete { .. } => {
            crate::alert!("People -> {}", error);
        }
    }
}

impl IntoResponse for PeopleError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, body) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            Self::FaceService(FaceCollectionError::InvalidImage(message)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Image rejected: {message}") }),
            ),
            Self::NotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("Person not found: {id}") }),
            ),
            Self::NoFaceDetected => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "No face detected" }),
            ),
            Self::FaceService(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Face recognition is unavailable." }),
            ),
            Self::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Photo storage is unavailable." }),
            ),
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "A database error occurred." }),
            ),
            Self::DeletionIncomplete {
                person_id,
                completed_steps,
                failed_step,
                ..
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Person was only partially deleted, retry the request to finish.",
                    "person_id": person_id,
                    "completed_steps": completed_steps,
                    "failed_step": failed_step,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_incomplete_deletion_response_names_failed_step() -> color_eyre::Result<()> {
        let response = PeopleError::DeletionIncomplete {
            person_id: "p1".to_string(),
            completed_steps: vec![DeletionStep::FaceEntries],
            failed_step: DeletionStep::StoredObjects,
            reason: "bucket offline".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        assert_eq!(body["person_id"], "p1");
        assert_eq!(body["completed_steps"][0], "face_entries");
        assert_eq!(body["failed_step"], "stored_objects");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_image_from_face_service_is_bad_request() {
        let response =
            PeopleError::FaceService(FaceCollectionError::InvalidImage("truncated".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
