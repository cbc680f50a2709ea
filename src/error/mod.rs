mod llm;
mod visadesk;

pub use llm::LlmError;
pub use visadesk::{ApiErrorBody, ApiErrorObject, ErrorKind, VisadeskError};

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
