//! Language-model adapter: turns a prompt into generated text or a classified failure.

mod client;
mod policy;
mod prompt;

pub use client::OpenAiClient;
pub use prompt::{DEFAULT_SYSTEM_PROMPT, Prompt};

use crate::error::LlmError;
use async_trait::async_trait;
use std::time::Duration;
use visadesk_schema::ChatUsage;

/// A successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Generated text, trimmed and non-empty.
    pub text: String,
    /// Model that produced the text, as reported upstream.
    pub model: String,
    pub usage: Option<ChatUsage>,
    pub finish_reason: Option<String>,
    /// Upstream calls made, retries included.
    pub attempts: u32,
}

/// Something that can answer a prompt within a deadline.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &Prompt, timeout: Duration) -> Result<Completion, LlmError>;
}
