use super::clean::html_to_text;
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Browser identity sent with every page request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Error scraping URL: request timed out")]
    Timeout,

    #[error("Error scraping URL: HTTP status {0}")]
    Status(u16),

    #[error("Error scraping URL: {0}")]
    Network(String),

    #[error("Error scraping URL: failed to read body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Single-page GET. Implementations must not retry.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw markup of `url`, or why it could not be fetched.
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;

    /// Normalized page text (see [`html_to_text`]).
    async fn fetch(&self, url: &str, max_chars: usize) -> Result<String, FetchError> {
        let html = self.fetch_html(url).await?;
        Ok(html_to_text(&html, max_chars))
    }
}

/// reqwest-backed fetcher with a fixed User-Agent and per-request timeout.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching URL: {}", url);
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!("Fetch failed for {}: {}", url, e);
                FetchError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetch of {} returned HTTP {}", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(FetchError::from)
    }
}
