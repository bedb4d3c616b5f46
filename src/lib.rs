pub mod api;
pub mod core;
pub mod llm;
pub mod nlp;
pub mod scraping;
pub mod testing;
pub mod tools;

// --- Primary core exports ---
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::AppState;

pub use nlp::relevance;
pub use tools::{crawl, extract, parse};
