use serde::{Deserialize, Serialize};

use super::QueryResponse;

/// `GET /api/chat/history` query string. Missing values take server defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub page: Option<u32>,

    #[serde(default)]
    pub page_size: Option<u32>,

    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHistoryResponse {
    pub queries: Vec<QueryResponse>,
    pub total_count: i64,
    pub page: u32,
    pub page_size: u32,
}
