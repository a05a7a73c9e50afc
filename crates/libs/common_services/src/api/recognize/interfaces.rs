use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecognizeRequest {
    /// Base64 image, optionally as a `data:` URL.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecognizedPerson {
    pub person_id: String,
    pub name: String,
    pub relationship: String,
    pub age: Option<i32>,
    pub notes: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecognizeResponse {
    pub matched: bool,
    /// The announcement when matched, otherwise why nothing matched.
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<RecognizedPerson>,
    /// Base64 encoded speech of `note`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_format: Option<String>,
}

impl RecognizeResponse {
    #[must_use]
    pub fn unmatched(note: &str) -> Self {
        Self {
            matched: false,
            note: note.to_string(),
            similarity: None,
            person: None,
            audio: None,
            audio_format: None,
        }
    }
}
