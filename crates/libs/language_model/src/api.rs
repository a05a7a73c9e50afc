use bon::bon;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LanguageModelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API error (status {status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("The model returned an empty completion")]
    EmptyCompletion,
}

pub type LanguageModelResult<T> = Result<T, LanguageModelError>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    #[must_use]
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize)]
pub struct ChatFullResponse {
    pub choices: Vec<FullChoice>,
}

#[derive(Deserialize)]
pub struct FullChoice {
    pub message: FullMessage,
}

#[derive(Deserialize)]
pub struct FullMessage {
    pub content: Option<String>,
}

impl ChatFullResponse {
    /// The trimmed content of the first choice, if the model produced any.
    #[must_use]
    pub fn first_content(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToString::to_string)
    }
}

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    config: ChatConfig,
}

#[bon]
impl ChatClient {
    #[builder(start_fn = with_base_url)]
    pub fn new(
        #[builder(start_fn)] base_url: &str,
        model: Option<String>,
        api_key: Option<String>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
        timeout: Option<Duration>,
    ) -> LanguageModelResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(Duration::from_secs(30)))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.unwrap_or_default(),
            api_key: api_key.filter(|k| !k.is_empty()),
            config: ChatConfig {
                temperature: temperature.unwrap_or(0.7),
                max_tokens: max_tokens.unwrap_or(100),
            },
        })
    }

    /// Send a single prompt, optionally preceded by a system message, and return the reply.
    #[builder]
    pub async fn chat(
        &self,
        #[builder(start_fn)] prompt: &str,
        system: Option<&str>,
    ) -> LanguageModelResult<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(prompt));
        self.call(messages).await
    }

    pub async fn call(&self, messages: Vec<Message>) -> LanguageModelResult<String> {
        let req_body = self.build_request(messages);
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!("Calling chat completion at {url}");

        let mut request = self.http.post(url).json(&req_body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(LanguageModelError::Api {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let full: ChatFullResponse = response.json().await?;
        full.first_content()
            .ok_or(LanguageModelError::EmptyCompletion)
    }

    #[must_use]
    pub fn build_request(&self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}
