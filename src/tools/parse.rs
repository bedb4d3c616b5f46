use serde_json::Value;
use tracing::{debug, warn};

pub const EMPTY_JSON: &str = "{}";

/// JSON pulled out of free-form model output.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// Pretty-printed (2-space) JSON, or `{}` when nothing parsed.
    pub json_text: String,
    pub value: Value,
    pub parsed: bool,
}

impl ParsedResponse {
    fn empty() -> Self {
        Self {
            json_text: EMPTY_JSON.to_string(),
            value: Value::Object(Default::default()),
            parsed: false,
        }
    }
}

/// Parse the span from the first `{` to the last `}` of `raw`.
///
/// Prose around the object is tolerated; anything that fails strict parsing
/// becomes `{}`.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        debug!("Model output has no JSON object");
        return ParsedResponse::empty();
    };
    if end < start {
        return ParsedResponse::empty();
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json_text) => ParsedResponse {
                json_text,
                value,
                parsed: true,
            },
            Err(e) => {
                warn!("Could not re-serialize model JSON: {}", e);
                ParsedResponse::empty()
            }
        },
        Err(e) => {
            warn!("Model JSON did not parse: {}", e);
            ParsedResponse::empty()
        }
    }
}
