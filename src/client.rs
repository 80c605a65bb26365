//! Chat-completion client.
//!
//! One blocking POST per prioritization. There is no retry and no cache;
//! failures surface as [`PrioritizerError::RemoteService`] carrying the raw
//! response body so it can be shown to the user.

use crate::config::{CompletionSettings, key_prefix};
use crate::error::{PrioritizerError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Something that turns a prompt into completion text.
pub trait CompletionBackend: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

impl<T: CompletionBackend + ?Sized> CompletionBackend for Arc<T> {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint (OpenRouter by default).
pub struct OpenRouterClient {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    model: String,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterClient {
    pub fn new(settings: &CompletionSettings, api_key: impl Into<String>) -> Result<Self> {
        install_crypto_provider();

        let mut builder = reqwest::blocking::Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| PrioritizerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            referer: settings.referer.clone(),
            title: settings.title.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl CompletionBackend for OpenRouterClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        info!(
            model = %self.model,
            key = %key_prefix(&self.api_key),
            prompt_chars = prompt.len(),
            "Requesting completion"
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
        };

        let mut call = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(referer) = &self.referer {
            call = call.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            call = call.header("X-Title", title);
        }

        let response = call.send().map_err(|e| {
            error!("Completion request failed: {}", e);
            PrioritizerError::remote(None, e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| PrioritizerError::remote(Some(status), e.to_string()))?;

        debug!(status, body_len = body.len(), "Completion response received");
        parse_completion_body(status, &body)
    }
}

/// Extract `choices[0].message.content`, or fail with the raw body attached.
pub fn parse_completion_body(status: u16, body: &str) -> Result<String> {
    if !(200..300).contains(&status) {
        error!(status, "Completion service returned an error status");
        return Err(PrioritizerError::remote(Some(status), body));
    }

    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        error!("Unexpected completion response shape: {}", e);
        PrioritizerError::remote(Some(status), body)
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| {
            error!("Completion response has no message content");
            PrioritizerError::remote(Some(status), body)
        })
}

/// reqwest is built without a default rustls provider; install ring once.
fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
