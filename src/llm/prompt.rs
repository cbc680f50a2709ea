use visadesk_schema::ChatMessage;

const BUILTIN_SYSTEM_PROMPT: &str = "\
You are a travel documentation assistant. For each question about travelling \
between countries, cover the visa that is needed, passport validity and blank-page \
rules, any other documents the traveller should carry, current travel advisories, \
typical processing times, and practical tips. Organise the answer into short \
headed sections with bullet points. Base the information on official government \
sources, say so when requirements depend on the traveller's nationality or \
purpose of travel, and recommend confirming with the relevant embassy before \
booking.";

/// System instruction sent ahead of every question. A build-time
/// `VISADESK_SYSTEM_PROMPT` replaces the built-in text.
pub const DEFAULT_SYSTEM_PROMPT: &str = match option_env!("VISADESK_SYSTEM_PROMPT") {
    Some(prompt) => prompt,
    None => BUILTIN_SYSTEM_PROMPT,
};

/// The two messages sent for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}
