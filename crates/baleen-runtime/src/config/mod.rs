//! Configuration module for the baleen runtime.
//!
//! This module provides TOML and environment based configuration loading
//! and validation for the bot, polling, retry, and logging settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config, load_config_from_file};
pub use schema::{
    BaleenConfig, BotSettings, LogFormat, LogLevel, LogOutput, LoggingConfig, PollingConfig,
    RetryConfig,
};
pub use validation::validate_config;
