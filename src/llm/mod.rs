//! Language-model access: a primary provider with one fallback.

pub mod prompt;
pub mod provider;

pub use prompt::build_extraction_prompt;
pub use provider::{ChatCompletionsProvider, LlmProvider, ProviderError, SamplingParams};

use crate::core::config::LlmConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("Error: no LLM API available, please check API keys")]
    NoProviderAvailable,

    #[error("Error calling LLM API: {primary_name}: {primary}; {secondary_name}: {secondary}")]
    AllProvidersFailed {
        primary_name: String,
        primary: ProviderError,
        secondary_name: String,
        secondary: ProviderError,
    },
}

/// Primary → secondary fallback over two [`LlmProvider`]s.
///
/// The secondary is consulted only when the primary fails; there is no retry
/// beyond that single hop.
#[derive(Clone)]
pub struct LlmGateway {
    primary: Arc<dyn LlmProvider>,
    secondary: Arc<dyn LlmProvider>,
}

impl LlmGateway {
    pub fn new(primary: Arc<dyn LlmProvider>, secondary: Arc<dyn LlmProvider>) -> Self {
        Self { primary, secondary }
    }

    /// Groq first, OpenRouter second, both resolved from config/env.
    pub fn from_config(client: reqwest::Client, cfg: &LlmConfig) -> Self {
        let timeout = Duration::from_secs(cfg.resolve_timeout_secs());
        let groq = ChatCompletionsProvider::new(
            "groq",
            client.clone(),
            cfg.resolve_groq_api_url(),
            cfg.resolve_groq_model(),
            cfg.resolve_groq_api_key(),
        )
        .with_timeout(timeout);
        let openrouter = ChatCompletionsProvider::new(
            "openrouter",
            client,
            cfg.resolve_openrouter_api_url(),
            cfg.resolve_openrouter_model(),
            cfg.resolve_openrouter_api_key(),
        )
        .with_timeout(timeout);

        if !groq.has_usable_key() && !openrouter.has_usable_key() {
            warn!("No LLM API key configured (GROQ_API_KEY / OPENROUTER_API_KEY); extractions will fail");
        }

        Self::new(Arc::new(groq), Arc::new(openrouter))
    }

    /// Raw model text for `prompt`.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let primary = match self.primary.complete(prompt).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };
        warn!(
            "{} API error: {}, trying {}",
            self.primary.name(),
            primary,
            self.secondary.name()
        );

        match self.secondary.complete(prompt).await {
            Ok(text) => {
                info!("{} answered after fallback", self.secondary.name());
                Ok(text)
            }
            Err(ProviderError::MissingCredential)
                if primary == ProviderError::MissingCredential =>
            {
                Err(LlmError::NoProviderAvailable)
            }
            Err(secondary) => {
                warn!("{} API error: {}", self.secondary.name(), secondary);
                Err(LlmError::AllProvidersFailed {
                    primary_name: self.primary.name().to_string(),
                    primary,
                    secondary_name: self.secondary.name().to_string(),
                    secondary,
                })
            }
        }
    }

    /// Build the extraction prompt and run it.
    pub async fn extract(&self, relevant_text: &str, query: &str) -> Result<String, LlmError> {
        let prompt = build_extraction_prompt(query, relevant_text);
        self.complete(&prompt).await
    }
}
