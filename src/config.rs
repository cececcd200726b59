//! Application configuration loaded from TOML.

use crate::llm_client::{LlmConfig, LlmProvider};
use crate::retry::RetryPolicy;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Top-level configuration.
///
/// Every section and every field is optional; missing values fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reasoning service settings.
    #[serde(default)]
    llm: LlmSettings,

    /// Retry budget for reasoning calls.
    #[serde(default)]
    retry: RetrySettings,

    /// HTTP listener settings.
    #[serde(default)]
    server: ServerSettings,
}

/// `[llm]` section.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider (openai, anthropic or responses).
    #[serde(default = "default_provider")]
    provider: LlmProvider,

    /// Model name.
    #[serde(default = "default_model")]
    model: String,

    /// Maximum tokens per response.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Endpoint override.
    #[serde(default)]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

/// `[retry]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per call.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    base_delay_ms: u64,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address.
    #[serde(default = "default_host")]
    host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    port: u16,
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml_str(&content)?;
        info!(provider = %config.llm.provider, model = %config.llm.model, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Builds the transport configuration.
    ///
    /// Reads the provider's key from the environment. A missing key is not
    /// an error here; automated players fail with a configuration error on
    /// their first call instead.
    #[instrument(skip(self), fields(provider = %self.llm.provider, model = %self.llm.model))]
    pub fn create_llm_config(&self) -> LlmConfig {
        let var = self.llm.provider.api_key_var();
        let api_key = std::env::var(var).ok().filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!(var, "API key not set, automated players will be unavailable");
        }

        let config = LlmConfig::new(
            self.llm.provider,
            api_key,
            self.llm.model.clone(),
            self.llm.max_tokens,
            Duration::from_secs(self.llm.timeout_secs),
        );
        match &self.llm.base_url {
            Some(url) => config.with_endpoint(url.clone()),
            None => config,
        }
    }

    /// Retry policy for reasoning calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.base_delay_ms),
        )
    }

    /// `host:port` to bind the HTTP server on.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(*config.retry().max_attempts(), 3);
        assert_eq!(*config.retry().base_delay_ms(), 1000);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [llm]
            provider = "anthropic"

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(*config.llm().provider(), LlmProvider::Anthropic);
        assert_eq!(config.llm().model(), "gpt-4o-mini");
        assert_eq!(*config.retry().max_attempts(), 5);
        assert_eq!(*config.retry().base_delay_ms(), 1000);
    }

    #[test]
    fn retry_policy_reflects_settings() {
        let config = AppConfig::from_toml_str(
            r#"
            [retry]
            max_attempts = 0
            base_delay_ms = 250
            "#,
        )
        .unwrap();
        let policy = config.retry_policy();
        assert_eq!(*policy.max_attempts(), 1);
        assert_eq!(*policy.base_delay(), Duration::from_millis(250));
    }

    #[test]
    fn base_url_overrides_endpoint() {
        let config = AppConfig::from_toml_str(
            r#"
            [llm]
            provider = "responses"
            base_url = "http://localhost:9999/v1/responses"
            "#,
        )
        .unwrap();
        let llm = config.create_llm_config();
        assert_eq!(llm.endpoint(), "http://localhost:9999/v1/responses");
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = AppConfig::from_toml_str("[llm\nprovider = ").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn unknown_provider_is_an_error() {
        assert!(AppConfig::from_toml_str("[llm]\nprovider = \"bard\"").is_err());
    }
}
