pub mod clean;
pub mod fetcher;
pub mod links;

pub use fetcher::{FetchError, HttpFetcher, PageFetcher};
