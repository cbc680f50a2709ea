mod chat_request;
mod chat_response;
mod error;

pub use chat_request::{ChatCompletionRequest, ChatMessage, ChatRole};
pub use chat_response::{ChatChoice, ChatChoiceMessage, ChatCompletionResponse, ChatUsage};
pub use error::{OpenaiErrorBody, OpenaiErrorObject};
