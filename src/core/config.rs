use std::str::FromStr;

// ---------------------------------------------------------------------------
// ParseAiConfig: file-based config loader (parseai.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_OPENROUTER_MODEL: &str = "mistralai/mistral-small-3.1-24b-instruct";

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// LLM provider sub-config (mirrors the `llm` key in parseai.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct LlmConfig {
    /// Primary provider key. Never logged.
    pub groq_api_key: Option<String>,
    /// Secondary provider key. Never logged.
    pub openrouter_api_key: Option<String>,
    pub groq_api_url: Option<String>,
    pub openrouter_api_url: Option<String>,
    pub groq_model: Option<String>,
    pub openrouter_model: Option<String>,
    /// Per-call timeout for chat completions. Default: 30.
    pub timeout_secs: Option<u64>,
}

impl LlmConfig {
    /// Groq key: JSON field → `GROQ_API_KEY` env var → `None`.
    pub fn resolve_groq_api_key(&self) -> Option<String> {
        non_blank(&self.groq_api_key).or_else(|| env_string("GROQ_API_KEY"))
    }

    /// OpenRouter key: JSON field → `OPENROUTER_API_KEY` env var → `None`.
    pub fn resolve_openrouter_api_key(&self) -> Option<String> {
        non_blank(&self.openrouter_api_key).or_else(|| env_string("OPENROUTER_API_KEY"))
    }

    pub fn resolve_groq_api_url(&self) -> String {
        non_blank(&self.groq_api_url)
            .or_else(|| env_string("GROQ_API_URL"))
            .unwrap_or_else(|| DEFAULT_GROQ_API_URL.to_string())
    }

    pub fn resolve_openrouter_api_url(&self) -> String {
        non_blank(&self.openrouter_api_url)
            .or_else(|| env_string("OPENROUTER_API_URL"))
            .unwrap_or_else(|| DEFAULT_OPENROUTER_API_URL.to_string())
    }

    pub fn resolve_groq_model(&self) -> String {
        non_blank(&self.groq_model)
            .or_else(|| env_string("GROQ_MODEL"))
            .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string())
    }

    pub fn resolve_openrouter_model(&self) -> String {
        non_blank(&self.openrouter_model)
            .or_else(|| env_string("OPENROUTER_MODEL"))
            .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string())
    }

    /// Timeout: JSON field → `LLM_TIMEOUT_SECS` env var → 30.
    pub fn resolve_timeout_secs(&self) -> u64 {
        self.timeout_secs
            .or_else(|| env_parse("LLM_TIMEOUT_SECS"))
            .unwrap_or(30)
    }
}

/// Crawl sub-config (mirrors the `crawl` key in parseai.json).
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct CrawlSettings {
    /// Linked pages fetched in addition to the seed. Default: 2.
    pub max_secondary_pages: Option<usize>,
    /// Pause before each secondary fetch. Default: 1000.
    pub politeness_delay_ms: Option<u64>,
    /// Per-page GET timeout. Default: 10.
    pub fetch_timeout_secs: Option<u64>,
    /// Characters kept from each fetched page. Default: 10000.
    pub max_page_chars: Option<usize>,
    /// Seed URLs remembered by the crawl cache. Default: 1000.
    pub cache_capacity: Option<u64>,
}

impl CrawlSettings {
    pub fn resolve_max_secondary_pages(&self) -> usize {
        self.max_secondary_pages
            .or_else(|| env_parse("CRAWL_MAX_SECONDARY_PAGES"))
            .unwrap_or(2)
    }

    pub fn resolve_politeness_delay_ms(&self) -> u64 {
        self.politeness_delay_ms
            .or_else(|| env_parse("CRAWL_POLITENESS_DELAY_MS"))
            .unwrap_or(1000)
    }

    pub fn resolve_fetch_timeout_secs(&self) -> u64 {
        self.fetch_timeout_secs
            .or_else(|| env_parse("CRAWL_FETCH_TIMEOUT_SECS"))
            .unwrap_or(10)
    }

    pub fn resolve_max_page_chars(&self) -> usize {
        self.max_page_chars
            .or_else(|| env_parse("CRAWL_MAX_PAGE_CHARS"))
            .unwrap_or(10_000)
    }

    pub fn resolve_cache_capacity(&self) -> u64 {
        self.cache_capacity
            .or_else(|| env_parse("CRAWL_CACHE_CAPACITY"))
            .unwrap_or(1_000)
    }
}

#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct StoreConfig {
    /// Age after which an extraction record is swept on the next insert. Default: 86400.
    pub ttl_secs: Option<i64>,
}

impl StoreConfig {
    pub fn resolve_ttl_secs(&self) -> i64 {
        self.ttl_secs
            .or_else(|| env_parse("RESULT_TTL_SECS"))
            .unwrap_or(86_400)
    }
}

#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct RelevanceConfig {
    /// Prompt text budget after filtering. Default: 5000.
    pub max_chars: Option<usize>,
}

impl RelevanceConfig {
    pub fn resolve_max_chars(&self) -> usize {
        self.max_chars
            .or_else(|| env_parse("RELEVANCE_MAX_CHARS"))
            .unwrap_or(5_000)
    }
}

/// Top-level config loaded from `parseai.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct ParseAiConfig {
    pub llm: LlmConfig,
    pub crawl: CrawlSettings,
    pub store: StoreConfig,
    pub relevance: RelevanceConfig,
}

/// Load `parseai.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `PARSEAI_CONFIG` env var path
/// 2. `./parseai.json`
/// 3. `../parseai.json`
///
/// Missing file → `ParseAiConfig::default()` (all env-var fallbacks apply).
/// Parse error → log a warning, return `ParseAiConfig::default()`.
pub fn load_config() -> ParseAiConfig {
    let mut candidates = vec![
        std::path::PathBuf::from("parseai.json"),
        std::path::PathBuf::from("../parseai.json"),
    ];
    if let Some(env_path) = env_string("PARSEAI_CONFIG") {
        candidates.insert(0, std::path::PathBuf::from(env_path));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return parse_config(&contents).unwrap_or_else(|e| {
            tracing::warn!(
                "parseai.json parse error at {}: {} - using defaults",
                path.display(),
                e
            );
            ParseAiConfig::default()
        });
    }

    ParseAiConfig::default()
}

pub fn parse_config(contents: &str) -> Result<ParseAiConfig, serde_json::Error> {
    let cfg = serde_json::from_str::<ParseAiConfig>(contents)?;
    tracing::info!("parseai.json loaded");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_sections() {
        let cfg = parse_config(r#"{"crawl": {"max_secondary_pages": 4}}"#).unwrap();
        assert_eq!(cfg.crawl.resolve_max_secondary_pages(), 4);
        assert_eq!(cfg.relevance.resolve_max_chars(), 5_000);
        assert_eq!(cfg.store.resolve_ttl_secs(), 86_400);
    }

    #[test]
    fn test_blank_json_values_fall_through_to_defaults() {
        let cfg = parse_config(r#"{"llm": {"groq_model": "  ", "openrouter_api_url": ""}}"#)
            .unwrap();
        assert_eq!(cfg.llm.resolve_groq_model(), DEFAULT_GROQ_MODEL);
        assert_eq!(
            cfg.llm.resolve_openrouter_api_url(),
            DEFAULT_OPENROUTER_API_URL
        );
    }

    #[test]
    fn test_explicit_key_wins() {
        let cfg = parse_config(r#"{"llm": {"groq_api_key": " gsk_live "}}"#).unwrap();
        assert_eq!(cfg.llm.resolve_groq_api_key().as_deref(), Some("gsk_live"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(parse_config("{ not json").is_err());
    }
}
