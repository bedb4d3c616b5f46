use super::config::ParseAiConfig;
use super::result_store::ResultStore;
use crate::crawl::CrawlConfig;
use crate::llm::LlmGateway;
use crate::scraping::{HttpFetcher, PageFetcher};
use std::sync::Arc;
use std::time::Duration;

/// Everything one extraction needs, built once and shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub llm: Arc<LlmGateway>,
    pub crawl_config: CrawlConfig,
    // key: seed url; capacity-bounded, never expires by time
    pub crawl_cache: moka::future::Cache<String, String>,
    pub result_store: Arc<ResultStore>,
    pub relevance_max_chars: usize,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("crawl_config", &self.crawl_config)
            .field("crawl_cache_entries", &self.crawl_cache.entry_count())
            .field("relevance_max_chars", &self.relevance_max_chars)
            .finish()
    }
}

impl AppState {
    pub fn new(http_client: reqwest::Client, config: ParseAiConfig) -> Self {
        let crawl_config = CrawlConfig::from_settings(&config.crawl);
        let fetcher = HttpFetcher::new(http_client.clone()).with_timeout(Duration::from_secs(
            config.crawl.resolve_fetch_timeout_secs(),
        ));
        let llm = LlmGateway::from_config(http_client, &config.llm);

        Self {
            crawl_cache: moka::future::Cache::builder()
                .max_capacity(config.crawl.resolve_cache_capacity())
                .build(),
            result_store: Arc::new(ResultStore::new(config.store.resolve_ttl_secs())),
            relevance_max_chars: config.relevance.resolve_max_chars(),
            fetcher: Arc::new(fetcher),
            llm: Arc::new(llm),
            crawl_config,
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_llm_gateway(mut self, llm: LlmGateway) -> Self {
        self.llm = Arc::new(llm);
        self
    }

    pub fn with_crawl_config(mut self, crawl_config: CrawlConfig) -> Self {
        self.crawl_config = crawl_config;
        self
    }
}
