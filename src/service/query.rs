use crate::config::{FailurePolicy, HistoryConfig, LlmConfig};
use crate::db::{DbActorHandle, DbExchange, ExchangeCreate, ExchangeMetadata};
use crate::error::{LlmError, VisadeskError};
use crate::llm::{CompletionBackend, Prompt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A question as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionInput {
    pub question: String,
    pub user_id: Option<String>,
}

/// A question that passed validation: trimmed, bounded, blank `user_id` dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuestion {
    pub question: String,
    pub user_id: Option<String>,
}

pub fn validate_question(
    input: QuestionInput,
    cfg: &HistoryConfig,
) -> Result<ValidQuestion, VisadeskError> {
    let question = input.question.trim();
    if question.is_empty() {
        return Err(VisadeskError::Validation {
            field: "query",
            reason: "must not be empty".to_string(),
        });
    }
    if question.chars().count() > cfg.max_question_chars {
        return Err(VisadeskError::Validation {
            field: "query",
            reason: format!("must be at most {} characters", cfg.max_question_chars),
        });
    }

    let user_id = normalize_user_id(input.user_id.as_deref());
    if let Some(user_id) = &user_id
        && user_id.chars().count() > cfg.max_user_id_chars
    {
        return Err(VisadeskError::Validation {
            field: "user_id",
            reason: format!("must be at most {} characters", cfg.max_user_id_chars),
        });
    }

    Ok(ValidQuestion {
        question: question.to_string(),
        user_id,
    })
}

/// Trims `user_id`; blank means absent.
pub fn normalize_user_id(user_id: Option<&str>) -> Option<String> {
    user_id
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Answers questions and records each attempt in the history store.
#[derive(Clone)]
pub struct QueryService {
    db: DbActorHandle,
    backend: Arc<dyn CompletionBackend>,
    llm_cfg: Arc<LlmConfig>,
    history_cfg: Arc<HistoryConfig>,
}

impl QueryService {
    pub fn new(
        db: DbActorHandle,
        backend: Arc<dyn CompletionBackend>,
        llm_cfg: Arc<LlmConfig>,
        history_cfg: Arc<HistoryConfig>,
    ) -> Self {
        Self {
            db,
            backend,
            llm_cfg,
            history_cfg,
        }
    }

    /// Validates, asks the backend, and appends exactly one exchange unless the
    /// failure policy is `discard`.
    pub async fn answer(&self, input: QuestionInput) -> Result<DbExchange, VisadeskError> {
        let ValidQuestion { question, user_id } = validate_question(input, &self.history_cfg)?;

        let prompt = Prompt::new(self.llm_cfg.system_prompt(), question.as_str());
        let timeout = self.llm_cfg.timeout();
        let start = Instant::now();

        let outcome = tokio::time::timeout(timeout, self.backend.complete(&prompt, timeout))
            .await
            .unwrap_or(Err(LlmError::Timeout(timeout)));
        let response_time_ms = i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX);

        match outcome {
            Ok(completion) => {
                let usage = completion.usage;
                let stored = self
                    .persist(ExchangeCreate {
                        question,
                        answer: completion.text,
                        user_id,
                        success: true,
                        response_time_ms: Some(response_time_ms),
                        metadata: Some(ExchangeMetadata {
                            model: Some(completion.model),
                            prompt_tokens: usage.map(|u| u.prompt_tokens),
                            completion_tokens: usage.map(|u| u.completion_tokens),
                            total_tokens: usage.map(|u| u.total_tokens),
                            finish_reason: completion.finish_reason,
                            attempts: Some(completion.attempts),
                            error_kind: None,
                        }),
                    })
                    .await?;

                info!(id = stored.id, response_time_ms, "Question answered");
                Ok(stored)
            }
            Err(source) => {
                let policy = self.history_cfg.failure_policy;
                warn!(
                    error = %source,
                    kind = source.kind_str(),
                    ?policy,
                    response_time_ms,
                    "Completion failed"
                );

                if !policy.stores_failures() {
                    return Err(VisadeskError::Upstream {
                        exchange_id: None,
                        source,
                    });
                }

                let stored = self
                    .persist(ExchangeCreate {
                        question,
                        answer: self.history_cfg.failure_message.clone(),
                        user_id,
                        success: false,
                        response_time_ms: Some(response_time_ms),
                        metadata: Some(ExchangeMetadata {
                            model: Some(self.llm_cfg.model.clone()),
                            error_kind: Some(source.kind_str().to_string()),
                            ..ExchangeMetadata::default()
                        }),
                    })
                    .await?;

                if policy == FailurePolicy::StoreOnly {
                    Ok(stored)
                } else {
                    Err(VisadeskError::Upstream {
                        exchange_id: Some(stored.id),
                        source,
                    })
                }
            }
        }
    }

    /// Runs the append on its own task so it completes even if this caller is dropped.
    async fn persist(&self, create: ExchangeCreate) -> Result<DbExchange, VisadeskError> {
        let db = self.db.clone();
        tokio::spawn(async move { db.append(create).await })
            .await
            .map_err(|e| VisadeskError::WriteTaskFailed(e.to_string()))?
    }
}
