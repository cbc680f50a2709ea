use crate::error::LlmError;
use crate::utils::logging::{body_preview, with_pretty_json_debug};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;
use visadesk_schema::OpenaiErrorBody;

/// Maps a non-success upstream reply onto an [`LlmError`].
pub(crate) fn classify_upstream_error(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> LlmError {
    let parsed = serde_json::from_slice::<OpenaiErrorBody>(body).ok();

    if let Some(error) = &parsed {
        with_pretty_json_debug(error, |pretty_error| {
            tracing::debug!(
                %status,
                code = ?error.code_str(),
                body = %pretty_error,
                "Upstream structured error"
            );
        });
    } else {
        tracing::debug!(
            %status,
            body = %body_preview(body),
            "Upstream unstructured error"
        );
    }

    let message = parsed
        .as_ref()
        .and_then(|e| e.inner.message.clone())
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let reason = match &parsed {
                Some(error) if error.is_quota_exhausted() => format!("quota exhausted: {message}"),
                _ => message,
            };
            LlmError::RateLimited {
                retry_after: parse_retry_after(headers),
                reason,
            }
        }
        _ => LlmError::UpstreamUnavailable {
            status: Some(status),
            message,
        },
    }
}

/// Reads a delay-seconds `retry-after` header. HTTP-date values are ignored.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Transport-level failure: no usable status line was received.
pub(crate) fn classify_transport_error(err: &reqwest::Error) -> LlmError {
    LlmError::UpstreamUnavailable {
        status: err.status(),
        message: err.to_string(),
    }
}
