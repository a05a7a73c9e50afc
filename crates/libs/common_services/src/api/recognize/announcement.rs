//! Builds the sentence that is spoken when a known face is recognized.

use crate::collaborators::{NoteRephraser, NoteSubject};
use crate::database::Person;
use crate::utils::truncate_words;
use app_state::AnnouncementSettings;
use tracing::{debug, warn};

pub const UNKNOWN: &str = "Unknown";
pub const EMPTY_NOTES_CLOSING: &str = "They care about you very much.";

/// Person fields as they are spoken, with placeholders for anything missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementSubject {
    pub name: String,
    pub relationship: String,
    pub age: String,
    pub notes: String,
}

impl AnnouncementSubject {
    #[must_use]
    pub fn from_person(person: Option<&Person>) -> Self {
        let field = |value: Option<&String>| {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string()
        };
        Self {
            name: field(person.and_then(|p| p.name.as_ref())),
            relationship: field(person.and_then(|p| p.relationship.as_ref())),
            age: person
                .and_then(|p| p.age)
                .map_or_else(|| UNKNOWN.to_string(), |age| age.to_string()),
            notes: person.map(|p| p.notes.trim().to_string()).unwrap_or_default(),
        }
    }

    fn as_note_subject(&self) -> NoteSubject<'_> {
        NoteSubject {
            name: &self.name,
            relationship: &self.relationship,
            age: &self.age,
            notes: &self.notes,
        }
    }
}

#[must_use]
pub fn introduction(subject: &AnnouncementSubject) -> String {
    format!(
        "This is {}, your {}, age {}.",
        subject.name, subject.relationship, subject.age
    )
}

/// The sentence after the introduction: rephrased notes, raw notes, or a warm default.
pub async fn closing(
    subject: &AnnouncementSubject,
    rephraser: Option<&dyn NoteRephraser>,
    settings: &AnnouncementSettings,
) -> String {
    if subject.notes.is_empty() {
        return EMPTY_NOTES_CLOSING.to_string();
    }
    let rephraser = match rephraser {
        Some(rephraser) if settings.rephrase_notes => rephraser,
        _ => return subject.notes.clone(),
    };

    match rephraser
        .rephrase(subject.as_note_subject(), settings.max_note_words)
        .await
    {
        Ok(text) if !text.trim().is_empty() => {
            debug!("Rephrased notes for {}", subject.name);
            truncate_words(text.trim(), settings.max_note_words)
        }
        Ok(_) => {
            warn!("Rephraser returned no text, using the raw notes.");
            subject.notes.clone()
        }
        Err(e) => {
            warn!("Rephrasing notes failed, using the raw notes: {e}");
            subject.notes.clone()
        }
    }
}

pub async fn compose(
    subject: &AnnouncementSubject,
    rephraser: Option<&dyn NoteRephraser>,
    settings: &AnnouncementSettings,
) -> String {
    format!(
        "{} {}",
        introduction(subject),
        closing(subject, rephraser, settings).await
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::PersonDetails;
    use async_trait::async_trait;
    use language_model::{LanguageModelError, LanguageModelResult};

    struct FixedRephraser(Option<&'static str>);

    #[async_trait]
    impl NoteRephraser for FixedRephraser {
        async fn rephrase(
            &self,
            _subject: NoteSubject<'_>,
            _max_words: usize,
        ) -> LanguageModelResult<String> {
            self.0
                .map(ToString::to_string)
                .ok_or(LanguageModelError::EmptyCompletion)
        }
    }

    fn settings(max_note_words: usize) -> AnnouncementSettings {
        AnnouncementSettings {
            rephrase_notes: true,
            max_note_words,
        }
    }

    fn subject(notes: &str) -> AnnouncementSubject {
        AnnouncementSubject::from_person(Some(&Person::new(
            "p1",
            PersonDetails {
                name: Some("Ann".to_string()),
                relationship: Some("daughter".to_string()),
                age: Some(43),
                notes: Some(notes.to_string()),
            },
        )))
    }

    #[test]
    fn test_missing_person_uses_placeholders() {
        let subject = AnnouncementSubject::from_person(None);
        assert_eq!(
            introduction(&subject),
            "This is Unknown, your Unknown, age Unknown."
        );
        assert!(subject.notes.is_empty());
    }

    #[test]
    fn test_blank_fields_use_placeholders() {
        let mut person = Person::new("p1", PersonDetails::default());
        person.name = Some("  ".to_string());
        person.relationship = Some("friend".to_string());
        let subject = AnnouncementSubject::from_person(Some(&person));
        assert_eq!(
            introduction(&subject),
            "This is Unknown, your friend, age Unknown."
        );
    }

    #[tokio::test]
    async fn test_empty_notes_use_default_closing() {
        let note = compose(&subject(""), None, &settings(50)).await;
        assert_eq!(
            note,
            "This is Ann, your daughter, age 43. They care about you very much."
        );
    }

    #[tokio::test]
    async fn test_notes_without_rephraser_are_spoken_raw() {
        let note = compose(&subject("Visits on Sundays."), None, &settings(50)).await;
        assert_eq!(note, "This is Ann, your daughter, age 43. Visits on Sundays.");
    }

    #[tokio::test]
    async fn test_rephrased_notes_are_capped() {
        let rephraser = FixedRephraser(Some("  Ann visits you every Sunday afternoon with flowers. "));
        let closing = closing(&subject("sundays"), Some(&rephraser), &settings(4)).await;
        assert_eq!(closing, "Ann visits you every.");
    }

    #[tokio::test]
    async fn test_rephrase_failure_falls_back_to_raw_notes() {
        let rephraser = FixedRephraser(None);
        let closing = closing(&subject("Visits on Sundays."), Some(&rephraser), &settings(50)).await;
        assert_eq!(closing, "Visits on Sundays.");
    }

    #[tokio::test]
    async fn test_rephrasing_can_be_disabled() {
        let rephraser = FixedRephraser(Some("Something else entirely."));
        let settings = AnnouncementSettings {
            rephrase_notes: false,
            max_note_words: 50,
        };
        let closing = closing(&subject("Visits on Sundays."), Some(&rephraser), &settings).await;
        assert_eq!(closing, "Visits on Sundays.");
    }
}
