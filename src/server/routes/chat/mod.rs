use crate::server::router::VisadeskState;
use axum::{
    Router,
    routing::{get, post},
};

pub mod extract;
pub mod handlers;
pub mod respond;

/// Routes mounted under `/api/chat`.
pub fn router() -> Router<VisadeskState> {
    Router::new()
        .route("/query", post(handlers::submit_query))
        .route("/history", get(handlers::query_history))
        .route("/history/{id}", get(handlers::query_by_id))
        .route("/stats", get(handlers::stats))
        .route("/health", get(handlers::chat_health))
}
