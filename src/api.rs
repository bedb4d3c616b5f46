use crate::core::result_store::StoreError;
use crate::extract::{retrieve_by_id, retrieve_error_response, submit_extraction};
use crate::types::*;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/extract", post(extract_handler))
        .route("/data/{id}", get(retrieve_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "parseai",
        "version": env!("CARGO_PKG_VERSION"),
        "data_retention_hours": state.result_store.ttl_secs() / 3600,
        "max_secondary_pages": state.crawl_config.max_secondary_pages,
        // Advertised only; not enforced.
        "rate_limit": "10 extractions per hour"
    }))
}

async fn extract_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExtractRequest>,
) -> Result<(StatusCode, Json<ExtractionResponse>), (StatusCode, Json<ErrorResponse>)> {
    let url = request.url.trim();
    let query = request.query.trim();
    if url.is_empty() || query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Both url and query are required".to_string(),
            }),
        ));
    }

    info!("Processing extraction request for {}", url);
    let response = submit_extraction(&state, url, query).await;
    if response.success {
        Ok((StatusCode::OK, Json(response)))
    } else {
        warn!("Extraction failed for {}: {}", url, response.summary);
        Ok((StatusCode::BAD_GATEWAY, Json(response)))
    }
}

async fn retrieve_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<RetrieveResponse>) {
    match retrieve_by_id(&state, &id).await {
        Ok(found) => (StatusCode::OK, Json(found)),
        Err(e) => {
            let status = match e {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::Corrupted => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(retrieve_error_response(&e)))
        }
    }
}
