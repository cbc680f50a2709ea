use crate::db::{DbExchange, HistoryStats};
use crate::service::PageWindow;
use chrono::Utc;
use visadesk_schema::{QueryHistoryResponse, QueryResponse, StatsResponse};

fn ms_to_secs(ms: f64) -> f64 {
    ms / 1000.0
}

// Response times stay far below 2^52 ms, so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
fn millis_as_f64(ms: i64) -> f64 {
    ms as f64
}

pub(crate) fn exchange_response(row: DbExchange) -> QueryResponse {
    QueryResponse {
        id: Some(row.id),
        query: row.question,
        response: row.answer,
        timestamp: row.created_at,
        response_time: row.response_time_ms.map(|ms| ms_to_secs(millis_as_f64(ms))),
        success: row.success,
        metadata: row
            .metadata
            .and_then(|meta| serde_json::to_value(meta.0).ok()),
    }
}

pub(crate) fn history_response(window: PageWindow) -> QueryHistoryResponse {
    QueryHistoryResponse {
        queries: window
            .result
            .exchanges
            .into_iter()
            .map(exchange_response)
            .collect(),
        total_count: window.result.total_count,
        page: window.page,
        page_size: window.page_size,
    }
}

pub(crate) fn stats_response(stats: HistoryStats) -> StatsResponse {
    StatsResponse {
        total_queries: stats.total_exchanges,
        failed_queries: stats.failed_exchanges,
        average_response_chars: stats.avg_answer_chars,
        average_response_time: stats.avg_response_time_ms.map(ms_to_secs),
        first_query_at: stats.earliest_at,
        last_query_at: stats.latest_at,
        system_status: "operational".to_string(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    }
}
