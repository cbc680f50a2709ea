mod basic;
mod history;
mod llm;

pub use basic::BasicConfig;
pub use history::{FailurePolicy, HistoryConfig};
pub use llm::LlmConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error as ThisError;

use crate::db::MAX_PAGE_SIZE;

/// Upper bound for `llm.retry_max_times`.
pub const MAX_RETRY_TIMES: usize = 3;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Language-model upstream settings (see `llm` table in config.toml).
    #[serde(default)]
    pub llm: LlmConfig,

    /// History paging, validation bounds and failure policy (see `history` table).
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("{0} must be set and non-empty")]
    Missing(&'static str),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "VISADESK_";

impl Config {
    /// Builds a Figment that merges, in increasing priority: defaults, `config.toml`,
    /// the conventional `OPENAI_API_KEY` / `DATABASE_URL` variables, and `VISADESK_*`
    /// variables (`__` separates tables, e.g. `VISADESK_LLM__MODEL`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment
            .merge(
                Env::raw()
                    .only(&["OPENAI_API_KEY"])
                    .map(|_| "llm.api_key".into()),
            )
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "basic.database_url".into()),
            )
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads and validates configuration.
    pub fn load() -> Result<Self, ConfigError> {
        let cfg: Self = Self::figment().extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks required fields and cross-field bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("llm.api_key"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "llm.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.llm.retry_max_times > MAX_RETRY_TIMES {
            return Err(ConfigError::Invalid {
                field: "llm.retry_max_times",
                reason: format!("must be at most {MAX_RETRY_TIMES}"),
            });
        }
        let history = &self.history;
        if history.max_page_size == 0 || history.max_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid {
                field: "history.max_page_size",
                reason: format!("must be within 1..={MAX_PAGE_SIZE}"),
            });
        }
        if history.default_page_size == 0 || history.default_page_size > history.max_page_size {
            return Err(ConfigError::Invalid {
                field: "history.default_page_size",
                reason: "must be within 1..=history.max_page_size".to_string(),
            });
        }
        if history.max_question_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "history.max_question_chars",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
