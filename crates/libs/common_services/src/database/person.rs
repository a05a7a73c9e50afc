use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A known person: who they are to the patient and where their face and photos live.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct Person {
    pub person_id: String,
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub age: Option<i32>,
    pub notes: String,
    /// Identifier of the enrolled face in the face collection.
    pub face_id: Option<String>,
    /// Object key of the primary photo.
    pub s3_key: Option<String>,
    #[serde(skip)]
    pub photo_hashes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Editable fields of a person. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDetails {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub age: Option<i32>,
    pub notes: Option<String>,
}

impl Person {
    #[must_use]
    pub fn new(person_id: &str, details: PersonDetails) -> Self {
        Self {
            person_id: person_id.to_string(),
            name: details.name,
            relationship: details.relationship,
            age: details.age,
            notes: details.notes.unwrap_or_default(),
            face_id: None,
            s3_key: None,
            photo_hashes: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Apply the provided fields and bump `updated_at`.
    pub fn apply(&mut self, details: &PersonDetails) {
        if let Some(name) = &details.name {
            self.name = Some(name.clone());
        }
        if let Some(relationship) = &details.relationship {
            self.relationship = Some(relationship.clone());
        }
        if let Some(age) = details.age {
            self.age = Some(age);
        }
        if let Some(notes) = &details.notes {
            self.notes.clone_from(notes);
        }
        self.updated_at = Some(Utc::now());
    }

    /// Storage prefix under which every photo of this person lives.
    #[must_use]
    pub fn storage_prefix(&self) -> String {
        person_prefix(&self.person_id)
    }
}

#[must_use]
pub fn person_prefix(person_id: &str) -> String {
    format!("{person_id}/")
}

#[must_use]
pub fn photo_key(person_id: &str, media_id: &str) -> String {
    format!("{person_id}/{media_id}.jpg")
}

/// The media id of a photo key, i.e. its file stem, if the key belongs to `person_id`.
#[must_use]
pub fn media_id_from_key<'a>(person_id: &str, key: &'a str) -> Option<&'a str> {
    key.strip_prefix(person_id)?
        .strip_prefix('/')?
        .strip_suffix(".jpg")
        .filter(|id| !id.is_empty() && !id.contains('/'))
}
