use crate::scraping::clean::truncate_chars;
use tracing::debug;

pub const DEFAULT_MAX_RELEVANT_CHARS: usize = 5_000;

/// Keyword sentence filter that bounds the text handed to the model.
pub struct RelevanceFilter {
    keywords: Vec<String>,
    max_chars: usize,
}

impl RelevanceFilter {
    pub fn new(query: &str) -> Self {
        Self::with_budget(query, DEFAULT_MAX_RELEVANT_CHARS)
    }

    pub fn with_budget(query: &str, max_chars: usize) -> Self {
        Self {
            keywords: query.split_whitespace().map(str::to_lowercase).collect(),
            max_chars,
        }
    }

    /// Sentences (split on `.`, `!`, `?`) containing any keyword, joined by
    /// spaces and capped to the budget. With no match the raw prefix is
    /// returned instead, so the result is only empty for empty input.
    pub fn filter(&self, text: &str) -> String {
        let matched: Vec<&str> = text
            .split(['.', '!', '?'])
            .filter(|sentence| self.is_relevant(sentence))
            .collect();

        if matched.is_empty() {
            debug!("No sentence matched {:?}; using raw prefix", self.keywords);
            return truncate_chars(text, self.max_chars);
        }

        debug!("{} sentence(s) matched {:?}", matched.len(), self.keywords);
        truncate_chars(&matched.join(" "), self.max_chars)
    }

    fn is_relevant(&self, sentence: &str) -> bool {
        let lower = sentence.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

pub fn filter_relevant(text: &str, query: &str) -> String {
    RelevanceFilter::new(query).filter(text)
}
