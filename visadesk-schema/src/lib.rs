pub mod chat;
pub mod openai;

pub use chat::{
    ApiInfo, ChatHealthDependencies, ChatHealthResponse, HealthResponse, HistoryParams,
    QueryHistoryResponse, QueryRequest, QueryResponse, StatsResponse,
};
pub use openai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole, ChatUsage,
    OpenaiErrorBody, OpenaiErrorObject,
};
