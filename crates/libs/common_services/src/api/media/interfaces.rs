use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Either `images` or a single `image`; both may be given.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddMediaRequest {
    #[serde(default)]
    pub images: Vec<String>,
    pub image: Option<String>,
}

impl AddMediaRequest {
    #[must_use]
    pub fn into_images(self) -> Vec<String> {
        self.images
            .into_iter()
            .chain(self.image)
            .filter(|image| !image.trim().is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MediaItem {
    pub media_id: String,
    pub key: String,
    pub url: Option<String>,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub is_primary: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaListResponse {
    pub person_id: String,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddMediaResponse {
    pub success: bool,
    pub person_id: String,
    pub added: Vec<MediaItem>,
    /// Images skipped because this person already has them.
    pub duplicates: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteMediaResponse {
    pub success: bool,
    pub person_id: String,
    pub media_id: String,
    /// Primary photo after the delete, which changes when the primary itself was removed.
    pub primary_photo_url: Option<String>,
}
