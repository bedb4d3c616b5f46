use crate::scraping::clean::truncate_chars;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream error bodies are cut to this many chars before they reach callers.
pub const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("API key missing or placeholder")]
    MissingCredential,

    #[error("request timed out")]
    Timeout,

    #[error("status={status} body={body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedBody(String),
}

/// Sampling knobs sent with every chat-completions call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 1024,
        }
    }
}

/// One model backend. Implementations make a single attempt.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Unset keys and the `your-...-here` template values shipped in sample configs.
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || (key.starts_with("your-") && key.ends_with("-here"))
}

/// OpenAI-compatible `/chat/completions` endpoint (Groq, OpenRouter, ...).
#[derive(Clone)]
pub struct ChatCompletionsProvider {
    name: String,
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    sampling: SamplingParams,
}

impl std::fmt::Debug for ChatCompletionsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsProvider")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_key", &self.has_usable_key())
            .finish()
    }
}

impl ChatCompletionsProvider {
    pub fn new(
        name: impl Into<String>,
        client: Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            timeout: DEFAULT_LLM_TIMEOUT,
            sampling: SamplingParams::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_usable_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !is_placeholder_key(k))
    }

    pub fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "model": self.model,
            "temperature": self.sampling.temperature,
            "max_tokens": self.sampling.max_tokens,
            "top_p": self.sampling.top_p,
        })
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = match self.api_key.as_deref() {
            Some(k) if !is_placeholder_key(k) => k.trim(),
            _ => return Err(ProviderError::MissingCredential),
        };

        info!("Calling {} ({})", self.name, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = truncate_chars(
                &response.text().await.unwrap_or_default(),
                MAX_ERROR_BODY_CHARS,
            );
            warn!("{} chat.completions failed: status={}", self.name, status);
            return Err(ProviderError::Status { status, body });
        }

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedBody(e.to_string()))?;

        value
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::MalformedBody("missing choices[0].message.content".to_string())
            })
    }
}
