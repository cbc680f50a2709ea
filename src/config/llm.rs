use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::llm::DEFAULT_SYSTEM_PROMPT;

/// Language-model upstream configuration managed by Figment.
///
/// Sampling defaults match what the chat UI was tuned against; change them in
/// `config.toml` rather than in code.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API; `chat/completions` is appended.
    /// TOML: `llm.api_url`. Default: `https://api.openai.com/v1/`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Bearer key for the upstream (required, non-empty).
    /// TOML: `llm.api_key`. Env: `OPENAI_API_KEY` or `VISADESK_LLM__API_KEY`.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub api_key: String,

    /// TOML: `llm.model`. Default: `gpt-3.5-turbo`.
    #[serde(default = "default_model")]
    pub model: String,

    /// TOML: `llm.max_tokens`. Default: `1000`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// TOML: `llm.temperature`. Default: `0.7`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// TOML: `llm.top_p`. Default: `1.0`.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// TOML: `llm.frequency_penalty`. Default: `0.2`.
    #[serde(default = "default_frequency_penalty")]
    pub frequency_penalty: f32,

    /// TOML: `llm.presence_penalty`. Default: `0.1`.
    #[serde(default = "default_presence_penalty")]
    pub presence_penalty: f32,

    /// Overall deadline for one question, retries included.
    /// TOML: `llm.timeout_secs`. Default: `60`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// TOML: `llm.connect_timeout_secs`. Default: `10`.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Max retry attempts after the first upstream call fails with a retryable error.
    /// TOML: `llm.retry_max_times`. Default: `2`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,

    /// Optional upstream HTTP proxy. If set, used for the reqwest client.
    /// TOML: `llm.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Replaces the built-in travel-documentation system instruction.
    /// TOML: `llm.system_prompt`.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            // No usable default. `Config::validate()` enforces non-empty.
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            frequency_penalty: default_frequency_penalty(),
            presence_penalty: default_presence_penalty(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry_max_times: default_retry_max_times(),
            proxy: None,
            system_prompt: None,
        }
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for llm.api_key",
        )),
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.openai.com/v1/").expect("default llm api_url must be a valid URL")
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    1.0
}

fn default_frequency_penalty() -> f32 {
    0.2
}

fn default_presence_penalty() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_retry_max_times() -> usize {
    2
}
