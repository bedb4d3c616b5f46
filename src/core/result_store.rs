use super::types::ExtractionRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const DEFAULT_TTL_SECS: i64 = 86_400;

/// A found record together with its parsed data.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredExtraction {
    pub record: ExtractionRecord,
    pub data: serde_json::Value,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid or expired ID")]
    NotFound,

    #[error("Invalid JSON data in cache")]
    Corrupted,
}

/// In-memory id → extraction map with lazy, insert-triggered expiry.
///
/// There is no background timer: entries older than the TTL are swept while
/// the next `put` holds the write lock, so a sweep can never race an insert.
#[derive(Debug)]
pub struct ResultStore {
    entries: RwLock<HashMap<String, ExtractionRecord>>,
    ttl_secs: i64,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECS)
    }
}

impl ResultStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl_secs,
        }
    }

    /// Store `record` and return its id.
    pub async fn put(&self, record: ExtractionRecord) -> String {
        self.put_at(record, Utc::now()).await
    }

    /// Same as [`put`](Self::put) with an explicit clock.
    pub async fn put_at(&self, record: ExtractionRecord, now: DateTime<Utc>) -> String {
        let mut entries = self.entries.write().await;

        let before = entries.len();
        let cutoff = now.timestamp() - self.ttl_secs;
        entries.retain(|_, r| r.timestamp >= cutoff);
        let evicted = before - entries.len();
        if evicted > 0 {
            info!("Evicted {} expired extraction record(s)", evicted);
        }

        let mut nonce = 0u32;
        let mut id = derive_id(&record.url, &record.query, now, nonce);
        while entries.contains_key(&id) {
            nonce += 1;
            id = derive_id(&record.url, &record.query, now, nonce);
        }

        debug!("Storing extraction {} for {}", id, record.url);
        entries.insert(id.clone(), record);
        id
    }

    /// Look up a record, re-checking that its data is still valid JSON.
    pub async fn get(&self, id: &str) -> Result<StoredExtraction, StoreError> {
        let entries = self.entries.read().await;
        let record = entries.get(id).ok_or(StoreError::NotFound)?;
        let data = serde_json::from_str(&record.data).map_err(|_| StoreError::Corrupted)?;
        Ok(StoredExtraction {
            record: record.clone(),
            data,
        })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// First 8 hex chars of md5(url ‖ query ‖ time[‖ nonce]).
fn derive_id(url: &str, query: &str, now: DateTime<Utc>, nonce: u32) -> String {
    let mut seed = format!(
        "{}{}{}",
        url,
        query,
        now.to_rfc3339_opts(SecondsFormat::Nanos, true)
    );
    if nonce > 0 {
        seed.push_str(&nonce.to_string());
    }
    let digest = format!("{:x}", md5::compute(seed.as_bytes()));
    digest[..8].to_string()
}

pub fn is_valid_id(id: &str) -> bool {
    id.len() == 8 && id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(data: &str, url: &str, query: &str, timestamp: i64) -> ExtractionRecord {
        ExtractionRecord {
            data: data.to_string(),
            timestamp,
            url: url.to_string(),
            query: query.to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_then_get_each_record() {
        let store = ResultStore::default();
        let now = Utc::now();
        let a = store
            .put(record("{\"a\": 1}", "https://a.test", "q1", now.timestamp()))
            .await;
        let b = store
            .put(record("{\"b\": 2}", "https://b.test", "q2", now.timestamp()))
            .await;

        assert_ne!(a, b);
        assert!(is_valid_id(&a), "bad id {a}");
        assert!(is_valid_id(&b), "bad id {b}");
        assert_eq!(store.get(&a).await.unwrap().record.url, "https://a.test");
        assert_eq!(store.get(&b).await.unwrap().record.data, "{\"b\": 2}");
        assert_eq!(store.get("0badc0de").await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_stale_record_survives_until_next_put() {
        let store = ResultStore::default();
        let now = Utc::now();
        let stale_id = store
            .put_at(
                record("{}", "https://old.test", "q", now.timestamp() - 90_000),
                now,
            )
            .await;
        assert!(store.get(&stale_id).await.is_ok());

        let fresh_id = store
            .put_at(record("{}", "https://new.test", "q", now.timestamp()), now)
            .await;
        assert_eq!(store.get(&stale_id).await, Err(StoreError::NotFound));
        assert!(store.get(&fresh_id).await.is_ok());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_records_within_ttl_are_kept() {
        let store = ResultStore::new(60);
        let now = Utc::now();
        let young = store
            .put_at(record("{}", "u", "q", now.timestamp() - 59), now)
            .await;
        store
            .put_at(record("{}", "u", "q", now.timestamp()), now + Duration::seconds(1))
            .await;
        assert!(store.get(&young).await.is_ok());
    }

    #[tokio::test]
    async fn test_same_instant_same_inputs_do_not_overwrite() {
        let store = ResultStore::default();
        let now = Utc::now();
        let first = store.put_at(record("{\"n\": 1}", "u", "q", now.timestamp()), now).await;
        let second = store.put_at(record("{\"n\": 2}", "u", "q", now.timestamp()), now).await;
        assert_ne!(first, second);
        assert_eq!(store.get(&first).await.unwrap().record.data, "{\"n\": 1}");
        assert_eq!(store.get(&second).await.unwrap().record.data, "{\"n\": 2}");
    }

    #[tokio::test]
    async fn test_get_hands_back_parsed_data() {
        let store = ResultStore::default();
        let id = store
            .put(record(
                "{\"price\": \"$10\", \"tags\": [1, 2]}",
                "u",
                "q",
                Utc::now().timestamp(),
            ))
            .await;
        let found = store.get(&id).await.unwrap();
        assert_eq!(
            found.data,
            serde_json::json!({"price": "$10", "tags": [1, 2]})
        );
        assert_eq!(found.record.url, "u");
    }

    #[tokio::test]
    async fn test_corrupted_data_is_reported() {
        let store = ResultStore::default();
        let id = store
            .put(record("{not json", "u", "q", Utc::now().timestamp()))
            .await;
        assert_eq!(store.get(&id).await, Err(StoreError::Corrupted));
    }

    #[test]
    fn test_ids_differ_across_instants() {
        let now = Utc::now();
        let a = derive_id("u", "q", now, 0);
        let b = derive_id("u", "q", now + Duration::nanoseconds(1), 0);
        assert_ne!(a, b);
        assert_eq!(a.len(), 8);
    }
}
