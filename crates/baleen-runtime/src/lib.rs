//! Baleen Runtime - Polling orchestration for the Baleen bot framework.
//!
//! This crate provides:
//! - Runtime lifecycle management (`Runtime`, `RuntimeBuilder`)
//! - The long-polling update loop with offset tracking
//! - Layered configuration (file, environment, programmatic)
//! - Logging configuration
//!
//! # Configuration
//!
//! Configuration merges four layers, later layers overriding earlier ones:
//! defaults, a config file, environment variables prefixed with `BALEEN_`,
//! and programmatic overrides.
//!
//! - `toml-config` (default): TOML configuration files
//! - `json-log`: JSON log output format
//!
//! ```ignore
//! use baleen_runtime::Runtime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads baleen.toml or config.toml from the search paths, then
//!     // BALEEN_* environment variables
//!     let runtime = Runtime::builder()
//!         .dispatcher(dispatcher)
//!         .build()?;
//!
//!     // Run until Ctrl+C
//!     runtime.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Shutdown
//!
//! `run` listens for Ctrl+C (and SIGTERM on Unix). On a signal the poll
//! loop stops fetching, the in-flight batch drains, and `run` returns.
//! `run_until` accepts any future as the shutdown trigger instead.

pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod runtime;

// Re-exports
pub use config::{
    BaleenConfig, BotSettings, ConfigError, ConfigLoader, ConfigResult, LogFormat, LogLevel,
    LogOutput, LoggingConfig, PollingConfig, RetryConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use poller::{ApiUpdateSource, UpdateSource};
pub use runtime::{LifecycleState, Runtime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
