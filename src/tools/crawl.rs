use crate::core::config::CrawlSettings;
use crate::scraping::clean::html_to_text;
use crate::scraping::links::discover_links;
use crate::scraping::FetchError;
use crate::AppState;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Limits for one seed-plus-neighbours crawl.
#[derive(Clone, Debug)]
pub struct CrawlConfig {
    pub max_secondary_pages: usize,
    /// Wait before each secondary fetch. Local to one crawl.
    pub politeness_delay: Duration,
    pub max_chars_per_page: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_secondary_pages: 2,
            politeness_delay: Duration::from_secs(1),
            max_chars_per_page: 10_000,
        }
    }
}

impl CrawlConfig {
    pub fn from_settings(settings: &CrawlSettings) -> Self {
        Self {
            max_secondary_pages: settings.resolve_max_secondary_pages(),
            politeness_delay: Duration::from_millis(settings.resolve_politeness_delay_ms()),
            max_chars_per_page: settings.resolve_max_page_chars(),
        }
    }
}

/// Crawl `url` and up to `max_secondary_pages` content links found on it.
///
/// Returns the page texts joined by newlines. The result is cached per seed
/// URL; a failed seed fetch is returned as-is and never cached. Secondary
/// pages that fail are skipped.
pub async fn crawl(state: &AppState, url: &str) -> Result<String, FetchError> {
    if let Some(cached) = state.crawl_cache.get(url).await {
        info!("Crawl cache hit for {}", url);
        return Ok(cached);
    }

    let start = Instant::now();
    let config = &state.crawl_config;

    let markup = state.fetcher.fetch_html(url).await?;
    let mut all_text = html_to_text(&markup, config.max_chars_per_page);

    let links = discover_links(url, &markup);
    let mut pages_added = 0usize;
    for link in links.iter().take(config.max_secondary_pages) {
        if !config.politeness_delay.is_zero() {
            tokio::time::sleep(config.politeness_delay).await;
        }
        match state.fetcher.fetch(link, config.max_chars_per_page).await {
            Ok(text) => {
                all_text.push('\n');
                all_text.push_str(&text);
                pages_added += 1;
            }
            Err(e) => warn!("Skipping linked page {}: {}", link, e),
        }
    }

    info!(
        "Crawled {} (+{} linked page(s), {} chars) in {}ms",
        url,
        pages_added,
        all_text.chars().count(),
        start.elapsed().as_millis()
    );

    state
        .crawl_cache
        .insert(url.to_string(), all_text.clone())
        .await;
    Ok(all_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ParseAiConfig;
    use crate::testing::MockFetcher;
    use std::sync::Arc;

    fn state_with(fetcher: MockFetcher) -> AppState {
        AppState::new(reqwest::Client::new(), ParseAiConfig::default())
            .with_fetcher(Arc::new(fetcher))
            .with_crawl_config(CrawlConfig {
                politeness_delay: Duration::ZERO,
                ..CrawlConfig::default()
            })
    }

    const SEED: &str = r#"<html><body>
        <p>Welcome to the university.</p>
        <a href="/programs">Programs</a>
        <a href="/news">News</a>
        <a href="/faculty">Faculty</a>
        <a href="/degrees">Degrees</a>
    </body></html>"#;

    #[tokio::test]
    async fn test_seed_plus_first_two_links() {
        let fetcher = MockFetcher::new()
            .with_page("https://uni.test", SEED)
            .with_page("https://uni.test/programs", "<p>BSc Physics.</p>")
            .with_page("https://uni.test/faculty", "<p>Dr. Smith.</p>")
            .with_page("https://uni.test/degrees", "<p>never fetched</p>");
        let state = state_with(fetcher.clone());

        let text = crawl(&state, "https://uni.test").await.unwrap();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Welcome to the university."));
        assert_eq!(lines[1], "BSc Physics.");
        assert_eq!(lines[2], "Dr. Smith.");
        assert_eq!(
            fetcher.calls(),
            vec![
                "https://uni.test",
                "https://uni.test/programs",
                "https://uni.test/faculty"
            ]
        );
    }

    #[tokio::test]
    async fn test_second_crawl_is_a_cache_hit() {
        let fetcher = MockFetcher::new()
            .with_page("https://uni.test", SEED)
            .with_page("https://uni.test/programs", "<p>BSc.</p>")
            .with_page("https://uni.test/faculty", "<p>Staff.</p>");
        let state = state_with(fetcher.clone());

        let first = crawl(&state, "https://uni.test").await.unwrap();
        let calls_after_first = fetcher.call_count();
        let second = crawl(&state, "https://uni.test").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn test_failing_secondary_is_skipped() {
        let fetcher = MockFetcher::new()
            .with_page("https://uni.test", SEED)
            .with_error("https://uni.test/programs", FetchError::Timeout)
            .with_page("https://uni.test/faculty", "<p>Staff.</p>");
        let state = state_with(fetcher);

        let text = crawl(&state, "https://uni.test").await.unwrap();
        assert!(text.ends_with("\nStaff."));
        assert_eq!(text.matches('\n').count(), 1);
    }

    #[tokio::test]
    async fn test_seed_failure_is_not_cached() {
        let fetcher = MockFetcher::new().with_error("https://down.test", FetchError::Timeout);
        let state = state_with(fetcher.clone());

        assert_eq!(
            crawl(&state, "https://down.test").await,
            Err(FetchError::Timeout)
        );
        assert_eq!(fetcher.call_count(), 1);
        assert!(state.crawl_cache.get("https://down.test").await.is_none());

        // Retried on the next request rather than served from cache.
        let _ = crawl(&state, "https://down.test").await;
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_politeness_delay_applies_per_secondary() {
        let fetcher = MockFetcher::new()
            .with_page("https://uni.test", SEED)
            .with_page("https://uni.test/programs", "<p>a</p>")
            .with_page("https://uni.test/faculty", "<p>b</p>");
        let state = state_with(fetcher).with_crawl_config(CrawlConfig {
            politeness_delay: Duration::from_millis(50),
            ..CrawlConfig::default()
        });

        let start = Instant::now();
        crawl(&state, "https://uni.test").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
