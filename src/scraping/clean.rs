use scraper::Html;

/// Subtrees dropped before text extraction.
pub const STRIPPED_TAGS: [&str; 6] = ["script", "style", "nav", "footer", "aside", "header"];

pub const DEFAULT_MAX_PAGE_CHARS: usize = 10_000;

/// Convert page markup into a single line of plain text.
///
/// Text inside [`STRIPPED_TAGS`] is skipped. Every line is trimmed and split
/// on double spaces; the non-empty chunks are joined with one space and the
/// result is cut to `max_chars` characters.
pub fn html_to_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let mut raw = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let stripped = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| STRIPPED_TAGS.contains(&el.name()))
        });
        if !stripped {
            raw.push_str(text);
        }
    }

    truncate_chars(&collapse_whitespace(&raw), max_chars)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep at most `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
