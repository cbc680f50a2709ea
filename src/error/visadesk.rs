use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error as ThisError;
use tracing::error;

use super::llm::LlmError;

#[derive(Debug, ThisError)]
pub enum VisadeskError {
    /// Input failed a bounds or presence check; nothing was sent upstream or stored.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Body, query string or path could not be parsed.
    #[error("Request rejected: {message}")]
    RequestRejected { code: &'static str, message: String },

    /// The language-model call failed. `exchange_id` is set when the attempt was recorded.
    #[error("Upstream error: {source}")]
    Upstream {
        exchange_id: Option<i64>,
        #[source]
        source: LlmError,
    },

    #[error("Exchange {0} not found")]
    NotFound(i64),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// The detached history write panicked or was aborted.
    #[error("History write task failed: {0}")]
    WriteTaskFailed(String),
}

/// Caller-facing error taxonomy, serialized as the `type` field of error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Upstream,
    Persistence,
    NotFound,
}

impl VisadeskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VisadeskError::Validation { .. } | VisadeskError::RequestRejected { .. } => {
                ErrorKind::Validation
            }
            VisadeskError::Upstream { .. } => ErrorKind::Upstream,
            VisadeskError::NotFound(_) => ErrorKind::NotFound,
            VisadeskError::RactorError(_)
            | VisadeskError::DatabaseError(_)
            | VisadeskError::WriteTaskFailed(_) => ErrorKind::Persistence,
        }
    }

    /// Id of the exchange recorded for a failed upstream call, if any.
    pub fn exchange_id(&self) -> Option<i64> {
        match self {
            VisadeskError::Upstream { exchange_id, .. } => *exchange_id,
            _ => None,
        }
    }
}

impl From<JsonRejection> for VisadeskError {
    fn from(rejection: JsonRejection) -> Self {
        let code = match rejection {
            JsonRejection::JsonSyntaxError(_) => "INVALID_JSON",
            _ => "INVALID_REQUEST",
        };
        VisadeskError::RequestRejected {
            code,
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for VisadeskError {
    fn from(rejection: QueryRejection) -> Self {
        VisadeskError::RequestRejected {
            code: "INVALID_REQUEST",
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for VisadeskError {
    fn from(rejection: PathRejection) -> Self {
        VisadeskError::RequestRejected {
            code: "INVALID_REQUEST",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for VisadeskError {
    fn into_response(self) -> axum::response::Response {
        let kind = self.kind();
        let (status, code, message, details) = match self {
            VisadeskError::Validation { field, reason } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Invalid {field}: {reason}"),
                Some(json!({ "field": field })),
            ),

            VisadeskError::RequestRejected { code, message } => {
                (StatusCode::BAD_REQUEST, code, message, None)
            }

            VisadeskError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Query {id} not found."),
                None,
            ),

            VisadeskError::Upstream {
                exchange_id,
                source,
            } => {
                let details = exchange_id.map(|id| json!({ "exchange_id": id }));
                let (status, code, msg) = match source {
                    LlmError::Timeout(_) => (
                        StatusCode::GATEWAY_TIMEOUT,
                        "UPSTREAM_TIMEOUT",
                        "The AI service took too long to respond. Please try again.",
                    ),
                    LlmError::RateLimited { .. } => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "RATE_LIMIT",
                        "AI service rate limit exceeded. Please try again later.",
                    ),
                    LlmError::UpstreamUnavailable { .. } => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "Failed to generate AI response.",
                    ),
                    LlmError::InvalidResponse(_) => (
                        StatusCode::BAD_GATEWAY,
                        "BAD_UPSTREAM_PAYLOAD",
                        "Failed to parse AI service response.",
                    ),
                };
                (status, code, msg.to_string(), details)
            }

            err @ (VisadeskError::RactorError(_)
            | VisadeskError::DatabaseError(_)
            | VisadeskError::WriteTaskFailed(_)) => {
                error!(error = %err, "History store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "Failed to access query history.".to_string(),
                    None,
                )
            }
        };

        let body = ApiErrorBody {
            inner: ApiErrorObject {
                code: code.to_string(),
                r#type: kind,
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub r#type: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
