#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use visadesk::LlmError;
use visadesk::db::{DbActorHandle, ExchangeCreate};
use visadesk::llm::{Completion, CompletionBackend, Prompt};
use visadesk_schema::ChatUsage;

static DB_SEQ: AtomicU64 = AtomicU64::new(0);

pub fn unique_sqlite_path(prefix: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let seq = DB_SEQ.fetch_add(1, Ordering::Relaxed);

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "visadesk-{prefix}-{}-{nanos}-{seq}.sqlite",
        std::process::id(),
    ));
    temp_path
}

pub async fn spawn_store(prefix: &str) -> DbActorHandle {
    let temp_path = unique_sqlite_path(prefix);
    let database_url = format!("sqlite:{}", temp_path.display());
    visadesk::db::spawn(&database_url)
        .await
        .expect("spawn history store")
}

pub fn exchange(question: &str, answer: &str) -> ExchangeCreate {
    ExchangeCreate {
        question: question.to_string(),
        answer: answer.to_string(),
        user_id: None,
        success: true,
        response_time_ms: Some(120),
        metadata: None,
    }
}

pub fn completion(text: &str) -> Completion {
    Completion {
        text: text.to_string(),
        model: "gpt-3.5-turbo-0125".to_string(),
        usage: Some(ChatUsage {
            prompt_tokens: 20,
            completion_tokens: 10,
            total_tokens: 30,
        }),
        finish_reason: Some("stop".to_string()),
        attempts: 1,
    }
}

/// Backend that replays queued outcomes, then falls back to a fixed answer.
pub struct ScriptedBackend {
    outcomes: Mutex<VecDeque<Result<Completion, LlmError>>>,
    delay: Option<Duration>,
    calls: AtomicU32,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedBackend {
    pub fn answering() -> Self {
        Self::with_outcomes(Vec::new())
    }

    pub fn with_outcomes(outcomes: Vec<Result<Completion, LlmError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            delay: None,
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: LlmError) -> Self {
        Self::with_outcomes(vec![Err(err)])
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &Prompt, _timeout: Duration) -> Result<Completion, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(completion(&format!("Answer to: {}", prompt.user))))
    }
}
