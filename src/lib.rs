pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod server;
pub mod service;
pub(crate) mod utils;

pub use config::Config;
pub use error::{LlmError, VisadeskError};
