use crate::{
    AnnouncementSettings, ApiSettings, DatabaseSettings, ImageSettings, LoggingSettings,
    RawSettings, RecognitionSettings, SecretSettings, SpeechSettings, StorageBackend,
    TextGenerationSettings,
};
use color_eyre::eyre::{Context, Result, bail};
use std::path::{PathBuf, absolute};

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub recognition: RecognitionSettings,
    pub image: ImageSettings,
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    pub announcement: AnnouncementSettings,
    pub text_generation: TextGenerationSettings,
    pub speech: SpeechSettings,
    pub secrets: SecretSettings,
}

/// Object storage settings with the root resolved to an absolute path.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub root: PathBuf,
    pub presign_expiry_minutes: i64,
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawSettings) -> Result<Self> {
        if !(0.0..=100.0).contains(&raw.recognition.similarity_threshold) {
            bail!(
                "recognition.similarity_threshold must be within 0..=100, got {}",
                raw.recognition.similarity_threshold
            );
        }
        if !(1..=100).contains(&raw.image.jpeg_quality) {
            bail!(
                "image.jpeg_quality must be within 1..=100, got {}",
                raw.image.jpeg_quality
            );
        }

        let root = absolute(&raw.storage.root).wrap_err("Invalid storage.root")?;
        let storage = StorageSettings {
            backend: raw.storage.backend,
            root,
            presign_expiry_minutes: raw.storage.presign_expiry_minutes,
        };

        Ok(Self {
            api: raw.api,
            logging: raw.logging,
            recognition: raw.recognition,
            image: raw.image,
            storage,
            database: raw.database,
            announcement: raw.announcement,
            text_generation: raw.text_generation,
            speech: raw.speech,
            secrets: raw.secrets,
        })
    }
}

impl AppSettings {
    /// Speech is only attempted when it is enabled and both the key and the voice are set.
    #[must_use]
    pub fn speech_configured(&self) -> bool {
        self.speech.enabled
            && !self.secrets.speech_api_key.is_empty()
            && !self.secrets.voice_id.is_empty()
    }

    #[must_use]
    pub fn text_generation_configured(&self) -> bool {
        self.text_generation.enabled && !self.text_generation.base_url.is_empty()
    }
}
