use app_state::SpeechSettings;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Speech service error (status {status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Speech service returned no audio")]
    EmptyAudio,
}

/// Turns announcement text into spoken audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;

    /// Short format name sent to clients alongside the audio.
    fn audio_format(&self) -> &'static str {
        "mp3"
    }
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// Client for an ElevenLabs style text-to-speech API.
#[derive(Clone)]
pub struct HttpSpeechSynthesizer {
    http: Client,
    base_url: String,
    voice_id: String,
    api_key: String,
    model_id: String,
    stability: f32,
    similarity_boost: f32,
}

impl HttpSpeechSynthesizer {
    pub fn new(
        settings: &SpeechSettings,
        api_key: &str,
        voice_id: &str,
    ) -> Result<Self, SpeechError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            voice_id: voice_id.to_string(),
            api_key: api_key.to_string(),
            model_id: settings.model_id.clone(),
            stability: settings.stability,
            similarity_boost: settings.similarity_boost,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let body = SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings {
                stability: self.stability,
                similarity_boost: self.similarity_boost,
            },
        };
        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api { status, body });
        }
        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        debug!("Synthesized {} bytes of audio", audio.len());
        Ok(audio.to_vec())
    }
}
