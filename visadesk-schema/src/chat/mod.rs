//! Public JSON bodies served under `/api/chat` and the service root.

mod health;
mod history;
mod query;
mod stats;

pub use health::{ApiInfo, ChatHealthDependencies, ChatHealthResponse, HealthResponse};
pub use history::{HistoryParams, QueryHistoryResponse};
pub use query::{QueryRequest, QueryResponse};
pub use stats::StatsResponse;
