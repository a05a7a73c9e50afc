mod http;
mod memory;

pub use http::HttpFaceCollection;
pub use memory::MemoryFaceCollection;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceCollectionError {
    #[error("No face detected in the image")]
    NoFaceDetected,

    #[error("Face service rejected the image: {0}")]
    InvalidImage(String),

    #[error("Face service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Face service error (status {status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Best match for a searched face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    pub face_id: String,
    /// The id the face was indexed under, which is the `person_id`.
    pub external_id: String,
    /// 0-100.
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFace {
    pub face_id: String,
    pub external_id: String,
}

/// A managed face collection: similarity search, enrollment and removal of faces.
#[async_trait]
pub trait FaceCollection: Send + Sync {
    /// Create the collection if it doesn't exist.
    async fn ensure_collection(&self) -> Result<(), FaceCollectionError>;

    /// Best match at or above `threshold`, if any.
    ///
    /// Fails with `NoFaceDetected` when the image contains no face.
    async fn search(
        &self,
        image: &[u8],
        threshold: f32,
    ) -> Result<Option<FaceMatch>, FaceCollectionError>;

    /// Index the most prominent face of `image` under `external_id`.
    /// Returns `None` when no face was found.
    async fn index(
        &self,
        image: &[u8],
        external_id: &str,
    ) -> Result<Option<IndexedFace>, FaceCollectionError>;

    /// All faces, or only those indexed under `external_id`.
    async fn list_faces(
        &self,
        external_id: Option<&str>,
    ) -> Result<Vec<IndexedFace>, FaceCollectionError>;

    /// Remove faces by id. Unknown ids are ignored. Returns how many were removed.
    async fn delete_faces(&self, face_ids: &[String]) -> Result<usize, FaceCollectionError>;
}
