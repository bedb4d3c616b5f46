use crate::core::result_store::StoreError;
use crate::crawl;
use crate::nlp::relevance::RelevanceFilter;
use crate::parse::parse_response;
use crate::types::*;
use crate::AppState;
use serde_json::json;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Pipeline position of one extraction, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Idle,
    Crawling,
    Filtering,
    Calling,
    Parsing,
    Stored,
    Done,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractionStage::Idle => "idle",
            ExtractionStage::Crawling => "crawling",
            ExtractionStage::Filtering => "filtering",
            ExtractionStage::Calling => "calling",
            ExtractionStage::Parsing => "parsing",
            ExtractionStage::Stored => "stored",
            ExtractionStage::Done => "done",
        };
        f.write_str(s)
    }
}

struct StageTracker<'a> {
    url: &'a str,
    stage: ExtractionStage,
}

impl<'a> StageTracker<'a> {
    fn new(url: &'a str) -> Self {
        Self {
            url,
            stage: ExtractionStage::Idle,
        }
    }

    fn advance(&mut self, next: ExtractionStage) {
        debug!("extraction {}: {} -> {}", self.url, self.stage, next);
        self.stage = next;
    }
}

/// Crawl → filter → prompt → call → parse → store for one `(url, query)`.
///
/// Never fails: crawl and model failures come back as an unsuccessful
/// response whose summary carries the error text.
pub async fn submit_extraction(state: &AppState, url: &str, query: &str) -> ExtractionResponse {
    let start = Instant::now();
    let mut tracker = StageTracker::new(url);
    info!("Extracting {:?} from {}", query, url);

    tracker.advance(ExtractionStage::Crawling);
    let crawled = match crawl::crawl(state, url).await {
        Ok(text) => text,
        Err(e) => {
            error!("Crawl failed for {}: {}", url, e);
            tracker.advance(ExtractionStage::Done);
            return failure_response(e.to_string());
        }
    };

    tracker.advance(ExtractionStage::Filtering);
    let relevant = RelevanceFilter::with_budget(query, state.relevance_max_chars).filter(&crawled);

    tracker.advance(ExtractionStage::Calling);
    let raw = match state.llm.extract(&relevant, query).await {
        Ok(raw) => raw,
        Err(e) => {
            error!("LLM extraction failed for {}: {}", url, e);
            tracker.advance(ExtractionStage::Done);
            return failure_response(e.to_string());
        }
    };

    tracker.advance(ExtractionStage::Parsing);
    let parsed = parse_response(&raw);
    if !parsed.parsed {
        warn!("No usable JSON in model output for {}; storing {{}}", url);
    }

    let id = state
        .result_store
        .put(ExtractionRecord::new(parsed.json_text.clone(), url, query))
        .await;
    tracker.advance(ExtractionStage::Stored);

    tracker.advance(ExtractionStage::Done);
    info!(
        "Extraction {} for {} finished in {}ms",
        id,
        url,
        start.elapsed().as_millis()
    );

    ExtractionResponse {
        success: true,
        summary: extract_summary(&raw),
        data: parsed.value,
        json_text: parsed.json_text,
        api_message: format!("API Endpoint ID: {}", id),
        status: format!("✅ Data extracted successfully! ID: {}", id),
        id,
    }
}

/// Fetch a stored extraction by id.
pub async fn retrieve_by_id(state: &AppState, id: &str) -> Result<RetrieveResponse, StoreError> {
    let id = id.trim();
    let found = state.result_store.get(id).await?;
    Ok(RetrieveResponse {
        data: found.data,
        status: format!("✅ Data retrieved for ID: {}", id),
    })
}

/// Caller-facing form of a lookup failure.
pub fn retrieve_error_response(err: &StoreError) -> RetrieveResponse {
    let status = match err {
        StoreError::NotFound => "❌ Error: Invalid or expired ID",
        StoreError::Corrupted => "❌ Error: Invalid JSON data",
    };
    RetrieveResponse {
        data: json!({ "error": err.to_string() }),
        status: status.to_string(),
    }
}

/// First blank-line block when the text announces a summary, else everything.
pub fn extract_summary(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("summary") || lower.contains("extracted") {
        let mut blocks = raw.split("\n\n");
        if let (Some(first), Some(_)) = (blocks.next(), blocks.next()) {
            return first.to_string();
        }
    }
    raw.to_string()
}

fn failure_response(message: String) -> ExtractionResponse {
    ExtractionResponse {
        success: false,
        status: format!("❌ {}", message),
        summary: message,
        data: serde_json::Value::Null,
        ..Default::default()
    }
}
