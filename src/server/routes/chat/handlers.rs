use super::{extract::QueryPayload, respond};
use crate::error::VisadeskError;
use crate::server::router::VisadeskState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::Utc;
use tracing::{info, warn};
use visadesk_schema::{
    ChatHealthDependencies, ChatHealthResponse, HistoryParams, QueryHistoryResponse,
    QueryResponse, StatsResponse,
};

/// POST /api/chat/query
pub(super) async fn submit_query(
    State(state): State<VisadeskState>,
    QueryPayload(input): QueryPayload,
) -> Result<Json<QueryResponse>, VisadeskError> {
    let preview: String = input.question.trim().chars().take(50).collect();
    info!(query = %preview, "Processing query");

    let stored = state.query.answer(input).await?;
    Ok(Json(respond::exchange_response(stored)))
}

/// GET /api/chat/history?page=&page_size=&user_id=
pub(super) async fn query_history(
    State(state): State<VisadeskState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<QueryHistoryResponse>, VisadeskError> {
    let Query(params) = params?;
    let window = state
        .history
        .page(params.page, params.page_size, params.user_id.as_deref())
        .await?;
    Ok(Json(respond::history_response(window)))
}

/// GET /api/chat/history/{id}
pub(super) async fn query_by_id(
    State(state): State<VisadeskState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<QueryResponse>, VisadeskError> {
    let Path(id) = id?;
    let row = state.history.get(id).await?;
    Ok(Json(respond::exchange_response(row)))
}

/// GET /api/chat/stats
pub(super) async fn stats(
    State(state): State<VisadeskState>,
) -> Result<Json<StatsResponse>, VisadeskError> {
    let stats = state.history.stats().await?;
    Ok(Json(respond::stats_response(stats)))
}

/// GET /api/chat/health
///
/// 200 when the history store answers, 503 otherwise.
pub(super) async fn chat_health(
    State(state): State<VisadeskState>,
) -> (StatusCode, Json<ChatHealthResponse>) {
    let database_ok = match state.history.probe().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "History store probe failed");
            false
        }
    };

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ChatHealthResponse {
        service: "chat".to_string(),
        status: if database_ok { "healthy" } else { "degraded" }.to_string(),
        timestamp: Utc::now(),
        dependencies: ChatHealthDependencies {
            database: if database_ok { "connected" } else { "unavailable" }.to_string(),
            // Config loading rejects an empty key, so a running server always has one.
            openai_api: "configured".to_string(),
        },
    };
    (status, Json(body))
}
