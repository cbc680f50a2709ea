use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /api/chat/stats` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_queries: i64,
    pub failed_queries: i64,
    /// Mean answer length in characters.
    pub average_response_chars: Option<f64>,
    /// Mean upstream latency in seconds.
    pub average_response_time: Option<f64>,
    pub first_query_at: Option<DateTime<Utc>>,
    pub last_query_at: Option<DateTime<Utc>>,
    pub system_status: String,
    pub api_version: String,
    pub timestamp: DateTime<Utc>,
}
