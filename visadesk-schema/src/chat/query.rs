use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /api/chat/query` body.
///
/// `query` is required; `user_id` is optional. Length bounds are enforced by the
/// query service before anything is sent upstream or stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// One stored exchange as returned to the chat UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub id: Option<i64>,
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    /// Upstream latency in seconds.
    pub response_time: Option<f64>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}
