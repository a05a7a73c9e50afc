use async_trait::async_trait;
use language_model::{ChatClient, LanguageModelResult};

const SYSTEM_PROMPT: &str = "You write short spoken reminders for a person living with memory loss. \
Reply with the reminder text only.";

/// What the rephraser knows about the person being announced.
#[derive(Debug, Clone, Copy)]
pub struct NoteSubject<'a> {
    pub name: &'a str,
    pub relationship: &'a str,
    pub age: &'a str,
    pub notes: &'a str,
}

/// Rewrites free-text notes into a conversational sentence suited for audio.
#[async_trait]
pub trait NoteRephraser: Send + Sync {
    async fn rephrase(
        &self,
        subject: NoteSubject<'_>,
        max_words: usize,
    ) -> LanguageModelResult<String>;
}

pub struct LanguageModelRephraser {
    client: ChatClient,
}

impl LanguageModelRephraser {
    #[must_use]
    pub const fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[must_use]
pub fn rephrase_prompt(subject: NoteSubject<'_>, max_words: usize) -> String {
    format!(
        "Convert this information into a natural spoken reminder for someone with Alzheimer's:\n\n\
         Person: {} ({}, age {})\n\
         Notes: {}\n\n\
         Create a factual, conversational message that reflects the exact sentiment and \
         information from the notes. Keep it under {max_words} words and suitable for audio playback.",
        subject.name, subject.relationship, subject.age, subject.notes
    )
}

#[async_trait]
impl NoteRephraser for LanguageModelRephraser {
    async fn rephrase(
        &self,
        subject: NoteSubject<'_>,
        max_words: usize,
    ) -> LanguageModelResult<String> {
        let prompt = rephrase_prompt(subject, max_words);
        self.client.chat(&prompt).system(SYSTEM_PROMPT).call().await
    }
}
