/// HTTP surface exercised in-process through the router.
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use parseai::api::router;
use parseai::core::config::{ParseAiConfig, StoreConfig};
use parseai::llm::LlmGateway;
use parseai::testing::{MockFetcher, MockProvider};
use parseai::{AppState, ExtractionRecord};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_state() -> Arc<AppState> {
    app_state_with(ParseAiConfig::default())
}

fn app_state_with(config: ParseAiConfig) -> Arc<AppState> {
    Arc::new(
        AppState::new(reqwest::Client::new(), config)
            .with_fetcher(Arc::new(
                MockFetcher::new().with_page("https://example.com", "Price: $10. Shipping: free."),
            ))
            .with_llm_gateway(LlmGateway::new(
                Arc::new(MockProvider::ok(
                    "primary",
                    "Here is the summary.\n\n{\"price\": \"$10\"}",
                )),
                Arc::new(MockProvider::ok("secondary", "unused")),
            )),
    )
}

async fn send(state: Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_extract(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app_state(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["max_secondary_pages"], 2);
}

#[tokio::test]
async fn test_health_reports_configured_retention() {
    let config = ParseAiConfig {
        store: StoreConfig {
            ttl_secs: Some(7200),
        },
        ..ParseAiConfig::default()
    };
    let (status, body) = send(app_state_with(config), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data_retention_hours"], 2);
}

#[tokio::test]
async fn test_extract_then_retrieve() {
    let state = app_state();
    let (status, body) = send(
        state.clone(),
        post_extract(json!({"url": "https://example.com", "query": "extract price"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["summary"], "Here is the summary.");
    assert_eq!(body["data"], json!({"price": "$10"}));
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 8);

    let (status, body) = send(state, get(&format!("/data/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"price": "$10"}));
    assert_eq!(body["status"], format!("✅ Data retrieved for ID: {id}"));
}

#[tokio::test]
async fn test_unknown_id_is_404() {
    let (status, body) = send(app_state(), get("/data/ffffffff")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"], json!({"error": "Invalid or expired ID"}));
}

#[tokio::test]
async fn test_corrupted_record_is_500() {
    let state = app_state();
    let id = state
        .result_store
        .put(ExtractionRecord::new("{broken".to_string(), "u", "q"))
        .await;
    let (status, body) = send(state, get(&format!("/data/{id}"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["data"], json!({"error": "Invalid JSON data in cache"}));
}

#[tokio::test]
async fn test_blank_query_is_rejected() {
    let (status, body) = send(
        app_state(),
        post_extract(json!({"url": "https://example.com", "query": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn test_crawl_failure_is_bad_gateway() {
    let (status, body) = send(
        app_state(),
        post_extract(json!({"url": "https://unknown.test", "query": "anything"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["summary"].as_str().unwrap().starts_with("Error"));
}
