use crate::api::media::interfaces::MediaItem;
use crate::database::Person;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Request Payloads ---

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddPersonRequest {
    /// Base64 image, optionally as a `data:` URL.
    pub image: Option<String>,
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub age: Option<i32>,
    pub notes: Option<String>,
}

/// Omitted or `null` fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePersonRequest {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub age: Option<i32>,
    pub notes: Option<String>,
    /// Extra photos to append to the gallery.
    #[serde(default)]
    pub images: Vec<String>,
}

// --- Response Payloads ---

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AddPersonResponse {
    pub success: bool,
    pub person_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The exact photo was uploaded before, so it wasn't stored again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_photo: Option<bool>,
}

impl AddPersonResponse {
    #[must_use]
    pub fn created(person_id: String, face_id: String) -> Self {
        Self {
            success: true,
            person_id,
            created: Some(true),
            updated: None,
            face_id: Some(face_id),
            message: None,
            duplicate_photo: None,
        }
    }

    #[must_use]
    pub fn updated(person_id: String, message: &str) -> Self {
        Self {
            success: true,
            person_id,
            created: None,
            updated: Some(true),
            face_id: None,
            message: Some(message.to_string()),
            duplicate_photo: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PersonResponse {
    #[serde(flatten)]
    pub person: Person,
    pub photo_url: Option<String>,
    pub media_count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePersonResponse {
    pub success: bool,
    pub person: PersonResponse,
    pub added_media: Vec<MediaItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletePersonResponse {
    pub success: bool,
    pub person_id: String,
    pub faces_removed: usize,
    pub objects_removed: usize,
    pub record_removed: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReminderItem {
    pub person_id: String,
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub age: Option<i32>,
    pub notes: String,
    pub added_date: DateTime<Utc>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemindersResponse {
    pub reminders: Vec<ReminderItem>,
}

/// A step of person deletion, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStep {
    FaceEntries,
    StoredObjects,
    Record,
}
