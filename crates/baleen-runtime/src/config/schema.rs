//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use baleen_client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use baleen_core::{DEFAULT_CONCURRENCY_LIMIT, RetryPolicy};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BaleenConfig {
    /// Bot API credentials and endpoint settings.
    #[serde(default)]
    pub bot: BotSettings,

    /// Long-polling settings.
    #[serde(default)]
    pub polling: PollingConfig,

    /// Retry behavior for API calls.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bot API credentials and endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Bot token issued by the platform.
    #[serde(default)]
    pub token: String,

    /// Base URL of the Bot API endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BotSettings {
    /// Per-request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Long-polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Maximum updates fetched per batch, between 1 and 120.
    #[serde(default = "default_poll_limit")]
    pub limit: i64,

    /// Long-poll wait in seconds. Zero means a short poll.
    #[serde(default = "default_poll_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of handlers running concurrently.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            limit: default_poll_limit(),
            timeout_secs: default_poll_timeout_secs(),
            concurrency_limit: default_concurrency_limit(),
        }
    }
}

fn default_poll_limit() -> i64 {
    100
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_concurrency_limit() -> usize {
    DEFAULT_CONCURRENCY_LIMIT
}

/// Retry behavior for API calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Exponential backoff multiplier.
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Maximum delay between retries in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Maximum retry attempts for `getUpdates` fetches.
    #[serde(default = "default_max_retries")]
    pub fetch_max_retries: u32,

    /// Maximum retry attempts for handler API calls.
    #[serde(default = "default_max_retries")]
    pub handler_max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            backoff_factor: default_backoff_factor(),
            max_delay_ms: default_max_delay_ms(),
            fetch_max_retries: default_max_retries(),
            handler_max_retries: default_max_retries(),
        }
    }
}

impl RetryConfig {
    /// Builds the retry policy applied to `getUpdates` fetches.
    pub fn fetch_policy(&self) -> RetryPolicy {
        self.apply(RetryPolicy::fetch(), self.fetch_max_retries)
    }

    /// Builds the retry policy applied to API calls made from handlers.
    pub fn handler_policy(&self) -> RetryPolicy {
        self.apply(RetryPolicy::handler(), self.handler_max_retries)
    }

    fn apply(&self, base: RetryPolicy, max_retries: u32) -> RetryPolicy {
        let mut policy = base.with_delays(
            Duration::from_millis(self.initial_delay_ms),
            self.backoff_factor,
            Duration::from_millis(self.max_delay_ms),
        );
        policy.max_retries = Some(max_retries);
        policy
    }
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_max_retries() -> u32 {
    5
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Directory for log files when the output is `file`.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Log file name when the output is `file`.
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Finest-grained tracing output.
    Trace,
    /// Debugging output.
    Debug,
    /// Informational output (default).
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the lowercase name used in filter directives.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to the corresponding `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output (default).
    #[default]
    Compact,
    /// Full fmt output.
    Full,
    /// Multi-line human-readable output.
    Pretty,
    /// Structured JSON output.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Write to standard output (default).
    #[default]
    Stdout,
    /// Write to standard error.
    Stderr,
    /// Write to a file through a non-blocking appender.
    File,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = BaleenConfig::default();

        assert!(config.bot.token.is_empty());
        assert_eq!(config.bot.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.polling.limit, 100);
        assert_eq!(config.polling.concurrency_limit, DEFAULT_CONCURRENCY_LIMIT);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_retry_policy_mapping() {
        let retry = RetryConfig {
            initial_delay_ms: 500,
            backoff_factor: 3.0,
            max_delay_ms: 10_000,
            fetch_max_retries: 2,
            handler_max_retries: 7,
        };

        let fetch = retry.fetch_policy();
        assert_eq!(fetch.max_retries, Some(2));
        assert_eq!(fetch.initial_delay, Duration::from_millis(500));
        assert_eq!(fetch.backoff_factor, 3.0);
        assert_eq!(fetch.max_delay, Duration::from_secs(10));
        assert!(fetch.allowed_codes.contains(&500));

        let handler = retry.handler_policy();
        assert_eq!(handler.max_retries, Some(7));
        assert!(!handler.allowed_codes.contains(&500));
    }
}
