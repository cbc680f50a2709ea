use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error as ThisError;

use super::IsRetryable;

/// Classified failure of one language-model call.
///
/// Messages are kept as owned strings so a failure can be logged, stored in
/// exchange metadata and returned to the caller without holding transport state.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum LlmError {
    /// The call did not finish before the deadline.
    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream answered 429.
    #[error("upstream rate limit exceeded: {reason}")]
    RateLimited {
        retry_after: Option<Duration>,
        reason: String,
    },

    /// Transport failure (`status: None`) or a non-success status other than 429.
    #[error("upstream unavailable{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    UpstreamUnavailable {
        status: Option<StatusCode>,
        message: String,
    },

    /// Upstream answered 2xx but the body was not a usable completion.
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Stable short name, stored in exchange metadata.
    pub fn kind_str(&self) -> &'static str {
        match self {
            LlmError::Timeout(_) => "timeout",
            LlmError::RateLimited { .. } => "rate_limited",
            LlmError::UpstreamUnavailable { .. } => "upstream_unavailable",
            LlmError::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl IsRetryable for LlmError {
    fn is_retryable(&self) -> bool {
        match self {
            LlmError::UpstreamUnavailable { status, .. } => {
                status.is_none_or(|s| s.is_server_error())
            }
            // The deadline covers every attempt, so there is no budget left to retry.
            LlmError::Timeout(_) => false,
            LlmError::RateLimited { .. } | LlmError::InvalidResponse(_) => false,
        }
    }
}
