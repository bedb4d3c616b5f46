use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
    pub query: String,
}

/// One stored extraction, addressed by its short id in the result store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtractionRecord {
    /// Canonical JSON text as produced by the response parser.
    pub data: String,
    /// Creation time, epoch seconds.
    pub timestamp: i64,
    pub url: String,
    pub query: String,
}

impl ExtractionRecord {
    pub fn new(data: String, url: &str, query: &str) -> Self {
        Self {
            data,
            timestamp: chrono::Utc::now().timestamp(),
            url: url.to_string(),
            query: query.to_string(),
        }
    }
}

/// Result of one `submit_extraction` call: the four values the caller displays.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ExtractionResponse {
    pub success: bool,
    pub summary: String,
    /// Extracted data; `null` when the pipeline failed before parsing.
    pub data: serde_json::Value,
    /// Canonical JSON text (2-space indent) that was stored.
    #[serde(skip)]
    pub json_text: String,
    /// Empty when nothing was stored.
    pub id: String,
    pub api_message: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetrieveResponse {
    pub data: serde_json::Value,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
