use aho_corasick::AhoCorasick;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Href fragments that mark a link as worth following.
pub const CONTENT_KEYWORDS: [&str; 6] = [
    "program",
    "course",
    "academic",
    "faculty",
    "department",
    "degree",
];

/// Collect content-looking links from `markup`, in document order.
///
/// The keyword test runs on the literal href. Hrefs starting with `/` are
/// resolved against `base_url`; any other form is returned as written.
pub fn discover_links(base_url: &str, markup: &str) -> Vec<String> {
    let matcher = match AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(CONTENT_KEYWORDS)
    {
        Ok(m) => m,
        Err(e) => {
            warn!("Link keyword matcher unavailable: {}", e);
            return Vec::new();
        }
    };
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(e) => {
            warn!("Error getting links from {}: {}", base_url, e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(markup);
    let base = Url::parse(base_url).ok();

    let links: Vec<String> = document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| matcher.is_match(*href))
        .map(|href| resolve_href(base.as_ref(), base_url, href))
        .collect();

    debug!("Discovered {} candidate link(s) on {}", links.len(), base_url);
    links
}

fn resolve_href(base: Option<&Url>, base_url: &str, href: &str) -> String {
    if !href.starts_with('/') {
        return href.to_string();
    }
    match base.and_then(|b| b.join(href).ok()) {
        Some(joined) => joined.to_string(),
        None => format!("{}{}", base_url.trim_end_matches('/'), href),
    }
}
