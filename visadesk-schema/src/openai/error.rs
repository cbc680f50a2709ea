//! OpenAI API error schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard envelope:
/// `{ "error": { "message": "...", "type": "...", "code": "...", "param": ... } }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenaiErrorBody {
    #[serde(rename = "error")]
    #[serde(default)]
    pub inner: OpenaiErrorObject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenaiErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// Usually a string such as `rate_limit_exceeded`, occasionally null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<Value>,
}

impl OpenaiErrorBody {
    pub fn code_str(&self) -> Option<&str> {
        self.inner.code.as_ref().and_then(Value::as_str)
    }

    /// Quota exhaustion is reported as 429 with one of these markers.
    pub fn is_quota_exhausted(&self) -> bool {
        self.inner.r#type.as_deref() == Some("insufficient_quota")
            || self.code_str() == Some("insufficient_quota")
    }
}
