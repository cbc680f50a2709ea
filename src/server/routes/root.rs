use axum::Json;
use chrono::Utc;
use visadesk_schema::{ApiInfo, HealthResponse};

/// GET /
pub async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "Visa Desk Q&A API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        health_check: "/health".to_string(),
    })
}

/// GET /health
///
/// Process liveness only; `/api/chat/health` also probes the history store.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "API is running successfully".to_string(),
        timestamp: Utc::now(),
    })
}
