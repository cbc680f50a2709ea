use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// One stored question/answer pair. Rows are never updated.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbExchange {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub user_id: Option<String>,
    /// `false` when `answer` is the failure placeholder.
    pub success: bool,
    pub response_time_ms: Option<i64>,
    pub metadata: Option<Json<ExchangeMetadata>>,
    pub created_at: DateTime<Utc>,
}

/// Free-form details recorded next to an exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Upstream attempts made, retries included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    /// Short failure kind for unsuccessful exchanges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

/// Fields supplied by the caller of `append`; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeCreate {
    pub question: String,
    pub answer: String,
    pub user_id: Option<String>,
    pub success: bool,
    pub response_time_ms: Option<i64>,
    pub metadata: Option<ExchangeMetadata>,
}

/// Aggregates over the whole table, recomputed on every call.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct HistoryStats {
    pub total_exchanges: i64,
    pub failed_exchanges: i64,
    pub avg_answer_chars: Option<f64>,
    pub avg_response_time_ms: Option<f64>,
    pub earliest_at: Option<DateTime<Utc>>,
    pub latest_at: Option<DateTime<Utc>>,
}

/// A window of exchanges together with the total it was cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub exchanges: Vec<DbExchange>,
    pub total_count: i64,
}
