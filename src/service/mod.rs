pub mod history;
pub mod query;

pub use history::{HistoryService, PageWindow};
pub use query::{QueryService, QuestionInput, ValidQuestion, validate_question};
