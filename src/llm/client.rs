use crate::config::{ConfigError, LlmConfig};
use crate::error::{IsRetryable, LlmError};
use crate::llm::policy::{classify_transport_error, classify_upstream_error};
use crate::llm::{Completion, CompletionBackend, Prompt};
use crate::utils::logging::body_preview;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;
use visadesk_schema::{ChatCompletionRequest, ChatCompletionResponse};

const USER_AGENT: &str = concat!("visadesk/", env!("CARGO_PKG_VERSION"));

/// Chat-completions client for OpenAI-compatible upstreams.
pub struct OpenAiClient {
    client: reqwest::Client,
    completions_url: Url,
    api_key: String,
    /// Model and sampling parameters; `messages` is filled per call.
    template: ChatCompletionRequest,
    request_timeout: Duration,
    retry_policy: ExponentialBuilder,
}

impl OpenAiClient {
    pub fn new(cfg: &LlmConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.timeout());

        if let Some(proxy_url) = &cfg.proxy {
            let proxy =
                reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| ConfigError::Invalid {
                    field: "llm.proxy",
                    reason: e.to_string(),
                })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| ConfigError::Invalid {
            field: "llm",
            reason: format!("failed to build http client: {e}"),
        })?;

        Self::with_client(cfg, client)
    }

    /// Uses a caller-built reqwest client instead of building one from `cfg`.
    pub fn with_client(cfg: &LlmConfig, client: reqwest::Client) -> Result<Self, ConfigError> {
        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(cfg.retry_max_times)
            .with_jitter();

        Ok(Self {
            client,
            completions_url: completions_url(&cfg.api_url)?,
            api_key: cfg.api_key.clone(),
            template: ChatCompletionRequest {
                model: cfg.model.clone(),
                messages: Vec::new(),
                max_tokens: Some(cfg.max_tokens),
                temperature: Some(cfg.temperature),
                top_p: Some(cfg.top_p),
                frequency_penalty: Some(cfg.frequency_penalty),
                presence_penalty: Some(cfg.presence_penalty),
                stream: false,
            },
            request_timeout: cfg.timeout(),
            retry_policy,
        })
    }

    fn build_request(&self, prompt: &Prompt) -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages: prompt.messages(),
            ..self.template.clone()
        }
    }

    async fn send_once(
        &self,
        body: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let resp = self
            .client
            .post(self.completions_url.clone())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let headers = resp.headers().clone();
            let bytes = resp.bytes().await.unwrap_or_default();
            return Err(classify_upstream_error(status, &headers, &bytes));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(&e))?;

        serde_json::from_slice::<ChatCompletionResponse>(&bytes).map_err(|e| {
            debug!(body = %body_preview(&bytes), "Undecodable completion body");
            LlmError::InvalidResponse(format!("undecodable completion body: {e}"))
        })
    }

    fn map_transport_error(&self, err: &reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.request_timeout)
        } else {
            classify_transport_error(err)
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, prompt: &Prompt, timeout: Duration) -> Result<Completion, LlmError> {
        let body = self.build_request(prompt);
        let attempts = AtomicU32::new(0);
        let start = Instant::now();

        let (this, body_ref, attempts_ref) = (self, &body, &attempts);
        let call = (move || async move {
            attempts_ref.fetch_add(1, Ordering::Relaxed);
            this.send_once(body_ref).await
        })
        .retry(self.retry_policy)
        .when(|err: &LlmError| err.is_retryable())
        .notify(|err, dur: Duration| {
            warn!(error = %err, "Completion retrying in {:?}", dur);
        });

        let resp = tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| LlmError::Timeout(timeout))??;

        let text = resp
            .first_text()
            .ok_or_else(|| LlmError::InvalidResponse("completion has no text".to_string()))?
            .to_string();
        let attempts = attempts.load(Ordering::Relaxed);

        info!(
            model = %body.model,
            attempts,
            total_tokens = resp.usage.map(|u| u.total_tokens),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completion received"
        );

        Ok(Completion {
            text,
            model: resp.model.clone().unwrap_or_else(|| body.model.clone()),
            usage: resp.usage,
            finish_reason: resp.first_finish_reason().map(str::to_string),
            attempts,
        })
    }
}

/// Joins `chat/completions` onto `base`, treating `base` as a directory.
fn completions_url(base: &Url) -> Result<Url, ConfigError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions")
        .map_err(|e| ConfigError::Invalid {
            field: "llm.api_url",
            reason: e.to_string(),
        })
}
