use serde::{Deserialize, Serialize};

use crate::db::MAX_PAGE_SIZE;

/// What the query service does with a question whose upstream call failed.
///
/// Applied uniformly to every request; there is no per-call override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the attempt with the failure placeholder and return the upstream error.
    #[default]
    StoreAndSurface,
    /// Record the attempt with the failure placeholder and return it as a normal result.
    StoreOnly,
    /// Record nothing and return the upstream error.
    Discard,
}

impl FailurePolicy {
    pub fn stores_failures(self) -> bool {
        !matches!(self, FailurePolicy::Discard)
    }
}

/// History and query-validation settings managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Page size used when `page_size` is omitted from a history request.
    /// TOML: `history.default_page_size`. Default: `10`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Larger requested page sizes are clamped to this value (at most 100).
    /// TOML: `history.max_page_size`. Default: `100`.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Longest accepted question, in characters.
    /// TOML: `history.max_question_chars`. Default: `1000`.
    #[serde(default = "default_max_question_chars")]
    pub max_question_chars: usize,

    /// Longest accepted `user_id`, in characters.
    /// TOML: `history.max_user_id_chars`. Default: `128`.
    #[serde(default = "default_max_user_id_chars")]
    pub max_user_id_chars: usize,

    /// TOML: `history.failure_policy` (`store_and_surface`, `store_only`, `discard`).
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Answer text stored for a question whose upstream call failed.
    /// TOML: `history.failure_message`.
    #[serde(default = "default_failure_message")]
    pub failure_message: String,
}

impl HistoryConfig {
    /// Resolves a requested page size against the configured bounds.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.clamp(1, MAX_PAGE_SIZE))
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_question_chars: default_max_question_chars(),
            max_user_id_chars: default_max_user_id_chars(),
            failure_policy: FailurePolicy::default(),
            failure_message: default_failure_message(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_max_question_chars() -> usize {
    1000
}

fn default_max_user_id_chars() -> usize {
    128
}

fn default_failure_message() -> String {
    "Sorry, I couldn't get an answer to your question right now. Please try again in a moment."
        .to_string()
}
