use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub recognition: RecognitionSettings,
    pub image: ImageSettings,
    pub storage: RawStorageSettings,
    pub database: DatabaseSettings,
    pub announcement: AnnouncementSettings,
    pub text_generation: TextGenerationSettings,
    pub speech: SpeechSettings,
    #[serde(default)]
    pub secrets: SecretSettings,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
    /// Base URL clients reach this server on. Presigned links are built from it.
    pub public_url: String,
    /// Empty means any origin is allowed.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Upper bound for request bodies. Base64 phone photos are large.
    pub max_body_mb: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FaceBackend {
    Http,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

/// Face collection service used for enrollment and matching.
#[derive(Debug, Deserialize, Clone)]
pub struct RecognitionSettings {
    pub backend: FaceBackend,
    pub endpoint: String,
    pub collection_id: String,
    /// Minimum similarity (0-100) for two faces to count as the same person.
    pub similarity_threshold: f32,
    pub request_timeout_seconds: u64,
}

/// How uploaded images are re-encoded before they are sent anywhere.
#[derive(Debug, Deserialize, Clone)]
pub struct ImageSettings {
    /// Longest side in pixels after normalization.
    pub max_dimension: u32,
    /// JPEG quality 1..=100.
    pub jpeg_quality: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawStorageSettings {
    pub backend: StorageBackend,
    pub root: PathBuf,
    pub presign_expiry_minutes: i64,
}

/// Record store connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: DatabaseBackend,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnnouncementSettings {
    /// Ask the text generation service to turn notes into a spoken sentence.
    pub rephrase_notes: bool,
    pub max_note_words: usize,
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct TextGenerationSettings {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_seconds: u64,
}

/// Speech synthesis REST endpoint, keyed by `secrets.speech_api_key` and `secrets.voice_id`.
#[derive(Debug, Deserialize, Clone)]
pub struct SpeechSettings {
    pub enabled: bool,
    pub base_url: String,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SecretSettings {
    pub database_url: String,
    pub face_service_api_key: String,
    pub text_generation_api_key: String,
    pub speech_api_key: String,
    pub voice_id: String,
    pub presign_secret: String,
}
