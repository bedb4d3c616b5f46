//! Mock collaborators for exercising the pipeline without network access.

use crate::llm::{LlmProvider, ProviderError};
use crate::scraping::{FetchError, PageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A page fetcher serving canned markup by URL.
///
/// Unknown URLs fail with `FetchError::Status(404)`. Every call is recorded.
#[derive(Default, Clone)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, Result<String, FetchError>>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `markup` for `url`.
    pub fn with_page(self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), Ok(markup.into()));
        self
    }

    /// Fail every request for `url` with `error`.
    pub fn with_error(self, url: impl Into<String>, error: FetchError) -> Self {
        self.pages.write().unwrap().insert(url.into(), Err(error));
        self
    }

    /// URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.calls.write().unwrap().push(url.to_string());
        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

/// A model provider returning a fixed answer or a fixed error.
pub struct MockProvider {
    name: String,
    response: Result<String, ProviderError>,
    prompts: RwLock<Vec<String>>,
}

impl MockProvider {
    pub fn ok(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response: Ok(text.into()),
            prompts: RwLock::new(Vec::new()),
        }
    }

    pub fn failing(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            response: Err(error),
            prompts: RwLock::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.read().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.write().unwrap().push(prompt.to_string());
        self.response.clone()
    }
}
