//! Reasoning-service client for OpenAI, Anthropic, and responses-style APIs.
//!
//! A [`CompletionTransport`] performs one HTTP round trip and classifies
//! failures into [`LlmErrorKind`]s. [`LlmClient`] wraps a transport in a
//! [`RetryPolicy`] so that rate limits, timeouts and transport hiccups are
//! retried with backoff while configuration problems fail fast.

use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use derive_getters::Getters;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI chat completions.
    OpenAI,
    /// Anthropic messages.
    Anthropic,
    /// Responses-style endpoint: `{model, input}` in, `output[].content[].text` out.
    Responses,
}

impl LlmProvider {
    /// Endpoint used when no override is configured.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
            LlmProvider::Anthropic => "https://api.anthropic.com/v1/messages",
            LlmProvider::Responses => "https://api.openai.com/v1/responses",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
            LlmProvider::Responses => "REASONING_API_KEY",
        }
    }
}

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Standing instructions.
    System,
    /// The caller.
    User,
    /// Earlier model output.
    Assistant,
}

/// A role-tagged message sent to the reasoning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content.into())
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content.into())
    }
}

/// Configuration for the HTTP transport.
#[derive(Debug, Clone, Getters)]
pub struct LlmConfig {
    provider: LlmProvider,
    #[getter(skip)]
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    #[getter(skip)]
    endpoint: Option<String>,
    timeout: Duration,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    ///
    /// A missing key is allowed here; calls fail with
    /// [`LlmErrorKind::Configuration`] when it is needed.
    #[instrument(skip(api_key), fields(provider = %provider, model = %model))]
    pub fn new(
        provider: LlmProvider,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        debug!(has_key = api_key.is_some(), "Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            endpoint: None,
            timeout,
        }
    }

    /// Overrides the provider's default endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Gets the API key, if one was found.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Endpoint to post to.
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }
}

/// Shape of a reasoning-service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum LlmErrorKind {
    /// Missing or refused credential.
    Configuration,
    /// The service asked us to slow down.
    RateLimited,
    /// The request did not complete in time.
    Timeout,
    /// Connection trouble or a server-side error.
    Transport,
    /// The response body did not have the expected shape.
    MalformedResponse,
    /// Any other non-success status.
    Rejected,
    /// Every attempt failed with a retryable error.
    RetriesExhausted,
}

impl LlmErrorKind {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            LlmErrorKind::RateLimited | LlmErrorKind::Timeout | LlmErrorKind::Transport
        )
    }
}

/// LLM client error.
#[derive(Debug, Clone, derive_more::Display)]
#[display("LLM error ({}): {} at {}:{}", kind, message, file, line)]
pub struct LlmError {
    /// What went wrong.
    pub kind: LlmErrorKind,
    /// Human-readable detail.
    pub message: String,
    /// Final underlying failure when retries were exhausted.
    pub last_cause: Option<Box<LlmError>>,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    pub fn new(kind: LlmErrorKind, message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(kind = %kind, error_message = %message, "LLM error created");
        Self {
            kind,
            message,
            last_cause: None,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Aggregates the final failure of a spent retry budget.
    #[track_caller]
    pub fn exhausted(attempts: u32, last: LlmError) -> Self {
        let mut error = Self::new(
            LlmErrorKind::RetriesExhausted,
            format!("Gave up after {} attempts: {}", attempts, last.message),
        );
        error.last_cause = Some(Box::new(last));
        error
    }

    /// The error's own kind.
    pub fn kind(&self) -> LlmErrorKind {
        self.kind
    }

    /// The kind of the underlying failure, looking through exhaustion.
    pub fn root_kind(&self) -> LlmErrorKind {
        self.last_cause
            .as_deref()
            .map_or(self.kind, LlmError::root_kind)
    }

    /// The last underlying failure, if retries were exhausted.
    pub fn last_cause(&self) -> Option<&LlmError> {
        self.last_cause.as_deref()
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// One round trip to a reasoning service.
#[async_trait::async_trait]
pub trait CompletionTransport: Send + Sync + std::fmt::Debug {
    /// Sends `messages` and returns the generated text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

/// Transport that talks to a provider over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: LlmConfig,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Builds an HTTP client with the configured timeout.
    #[instrument(skip(config), fields(provider = %config.provider()))]
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(*config.timeout())
            .build()
            .map_err(|e| {
                LlmError::new(
                    LlmErrorKind::Configuration,
                    format!("Failed to build HTTP client: {}", e),
                )
            })?;
        Ok(Self { config, http })
    }

    fn request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        match self.config.provider() {
            LlmProvider::OpenAI => serde_json::json!({
                "model": self.config.model(),
                "max_tokens": self.config.max_tokens(),
                "messages": messages,
            }),
            LlmProvider::Anthropic => {
                let system = messages
                    .iter()
                    .filter(|m| m.role == ChatRole::System)
                    .map(|m| m.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                let conversation: Vec<_> = messages
                    .iter()
                    .filter(|m| m.role != ChatRole::System)
                    .collect();
                serde_json::json!({
                    "model": self.config.model(),
                    "max_tokens": self.config.max_tokens(),
                    "system": system,
                    "messages": conversation,
                })
            }
            LlmProvider::Responses => serde_json::json!({
                "model": self.config.model(),
                "input": messages,
            }),
        }
    }
}

#[async_trait::async_trait]
impl CompletionTransport for HttpTransport {
    #[instrument(skip(self, messages), fields(provider = %self.config.provider(), model = %self.config.model(), num_messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let api_key = self.config.api_key().ok_or_else(|| {
            LlmError::new(
                LlmErrorKind::Configuration,
                format!("{} environment variable not set", self.config.provider().api_key_var()),
            )
        })?;

        let request = self
            .http
            .post(self.config.endpoint())
            .header("content-type", "application/json");
        let request = match self.config.provider() {
            LlmProvider::OpenAI => request.bearer_auth(api_key),
            LlmProvider::Anthropic => request
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01"),
            LlmProvider::Responses => request.header("x-api-key", api_key),
        };

        debug!("Sending request");
        let response = request
            .json(&self.request_body(messages))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_send_error)?;

        if !status.is_success() {
            warn!(status = %status, "Reasoning service returned an error status");
            return Err(classify_status(status, &body));
        }

        let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            LlmError::new(
                LlmErrorKind::MalformedResponse,
                format!("Failed to parse response: {}", e),
            )
        })?;

        let content = extract_text(*self.config.provider(), &json).ok_or_else(|| {
            LlmError::new(
                LlmErrorKind::MalformedResponse,
                format!("No text content in {} response", self.config.provider()),
            )
        })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content.trim().to_string())
    }
}

fn classify_send_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::new(LlmErrorKind::Timeout, format!("Request timed out: {}", err))
    } else {
        LlmError::new(LlmErrorKind::Transport, format!("Request failed: {}", err))
    }
}

/// Maps a non-success status onto an error kind.
fn classify_status(status: StatusCode, body: &str) -> LlmError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmErrorKind::Configuration,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => LlmErrorKind::Timeout,
        StatusCode::TOO_MANY_REQUESTS => LlmErrorKind::RateLimited,
        s if s.is_server_error() => LlmErrorKind::Transport,
        _ => LlmErrorKind::Rejected,
    };
    LlmError::new(kind, format!("API error {}: {}", status, body))
}

/// Pulls the generated text out of a provider's response body.
fn extract_text(provider: LlmProvider, json: &serde_json::Value) -> Option<String> {
    match provider {
        LlmProvider::OpenAI => json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string),
        LlmProvider::Anthropic => json["content"][0]["text"].as_str().map(str::to_string),
        LlmProvider::Responses => json["output"]
            .as_array()?
            .iter()
            .filter_map(|item| item["content"].as_array())
            .flatten()
            .find_map(|part| part["text"].as_str())
            .map(str::to_string),
    }
}

/// Reasoning client: a transport plus a retry policy.
#[derive(Debug, Clone)]
pub struct LlmClient {
    transport: Arc<dyn CompletionTransport>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl LlmClient {
    /// Creates a client that talks HTTP and sleeps on the tokio timer.
    #[instrument(skip(config), fields(provider = %config.provider()))]
    pub fn new(config: LlmConfig, policy: RetryPolicy) -> Result<Self, LlmError> {
        info!("Creating LLM client");
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            policy,
            Arc::new(TokioSleeper),
        ))
    }

    /// Creates a client around an arbitrary transport and sleeper.
    pub fn with_transport(
        transport: Arc<dyn CompletionTransport>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            transport,
            policy,
            sleeper,
        }
    }

    /// The retry policy in force.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generates text for `messages`, retrying transient failures.
    #[instrument(skip(self, messages), fields(num_messages = messages.len()))]
    pub async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let transport = &self.transport;
        self.policy
            .run(self.sleeper.as_ref(), |attempt| async move {
                debug!(attempt, "Calling reasoning service");
                transport.complete(messages).await
            })
            .await
    }

    /// Generates text for a single user prompt.
    pub async fn prompt(&self, user_message: &str) -> Result<String, LlmError> {
        self.generate(&[ChatMessage::user(user_message)]).await
    }
}
