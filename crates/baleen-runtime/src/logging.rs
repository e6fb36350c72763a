//! Logging utilities for the baleen framework.
//!
//! This module provides a unified logging setup using `tracing` and
//! `tracing-subscriber`, driven either by a [`LoggingConfig`] or manually
//! through the builder.
//!
//! # Configuration-Based Initialization
//!
//! ```rust,ignore
//! use baleen_runtime::config::load_config;
//! use baleen_runtime::logging;
//!
//! let config = load_config()?;
//! let _guard = logging::init_from_config(&config.logging);
//! ```
//!
//! # Manual Initialization
//!
//! ```rust,ignore
//! use baleen_runtime::logging::LoggingBuilder;
//!
//! LoggingBuilder::new()
//!     .with_level(tracing::Level::DEBUG)
//!     .directive("baleen_core=trace")
//!     .init();
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig};

/// Initialize logging from a [`LoggingConfig`].
///
/// Returns the worker guard of the non-blocking file writer when file output
/// is configured. The guard must be kept alive for the lifetime of the
/// program, otherwise buffered log lines are lost on shutdown.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    // try_init tolerates an already-installed subscriber
    LoggingBuilder::from_config(config).try_init().unwrap_or(None)
}

/// A builder for configuring logging.
///
/// # Example
///
/// ```rust,ignore
/// use baleen_runtime::logging::LoggingBuilder;
///
/// LoggingBuilder::new()
///     .with_level(tracing::Level::DEBUG)
///     .with_thread_ids(true)
///     .init();
/// ```
#[derive(Default)]
pub struct LoggingBuilder {
    directives: Vec<String>,
    level: Option<tracing::Level>,
    format: LogFormat,
    output: LogOutput,
    with_target: bool,
    with_thread_ids: bool,
    with_file: bool,
    with_line_number: bool,
    directory: Option<PathBuf>,
    file_name: Option<String>,
}

impl LoggingBuilder {
    /// Create a new logging builder.
    pub fn new() -> Self {
        Self {
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            with_target: true,
            ..Default::default()
        }
    }

    /// Create a builder from a [`LoggingConfig`].
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut builder = Self::new();

        builder.level = Some(config.level.to_tracing_level());
        builder.format = config.format;
        builder.output = config.output;
        builder.directory.clone_from(&config.directory);
        builder.file_name.clone_from(&config.file_name);

        builder
    }

    /// Set the global log level.
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Add a filter directive.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// builder.directive("baleen_runtime=debug")
    ///        .directive("baleen_core=trace")
    /// ```
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    /// Set the output format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output destination.
    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Include the target (module path) in log output.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Include thread IDs in log output.
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// Include file names in log output.
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self
    }

    /// Include line numbers in log output.
    pub fn with_line_number(mut self, enabled: bool) -> Self {
        self.with_line_number = enabled;
        self
    }

    /// Set the directory for file output.
    pub fn directory(mut self, path: PathBuf) -> Self {
        self.directory = Some(path);
        self
    }

    /// Set the file name for file output.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Build the filter from directives.
    fn build_filter(&self) -> EnvFilter {
        // Use tracing::Level's Display implementation (e.g., "INFO" -> lowercase "info")
        let base_level = self.level.unwrap_or(tracing::Level::INFO);
        let base_filter = base_level.to_string().to_lowercase();

        // Check for RUST_LOG environment variable first
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&base_filter));

        // Add user-specified directives
        for directive in &self.directives {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }

        filter
    }

    /// Initialize the logging system, ignoring failures.
    pub fn init(self) -> Option<WorkerGuard> {
        self.try_init().unwrap_or(None)
    }

    /// Try to initialize the logging system.
    ///
    /// Returns the worker guard of the non-blocking writer when file output
    /// is configured.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, TryInitError> {
        let filter = self.build_filter();

        // Macro to reduce repetition when configuring layers (non-JSON formats)
        macro_rules! configure_layer {
            ($layer:expr) => {
                $layer
                    .with_target(self.with_target)
                    .with_thread_ids(self.with_thread_ids)
                    .with_file(self.with_file)
                    .with_line_number(self.with_line_number)
            };
        }

        // Helper macro to reduce repetition in format matching
        macro_rules! init_with_writer {
            ($writer:expr) => {
                match self.format {
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => {
                        let layer = fmt::layer().json().with_writer($writer);
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Compact => {
                        let layer = configure_layer!(fmt::layer().compact().with_writer($writer));
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Full => {
                        let layer = configure_layer!(fmt::layer().with_writer($writer));
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Pretty => {
                        let layer = configure_layer!(fmt::layer().pretty().with_writer($writer));
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                }
            };
        }

        // Choose writer based on output configuration, then apply format
        match self.output {
            LogOutput::Stdout => init_with_writer!(std::io::stdout).map(|()| None),
            LogOutput::Stderr => init_with_writer!(std::io::stderr).map(|()| None),
            LogOutput::File => {
                let directory = self.directory.clone().unwrap_or_else(|| PathBuf::from("."));
                let file_name = self
                    .file_name
                    .clone()
                    .unwrap_or_else(|| String::from("baleen.log"));

                let appender = tracing_appender::rolling::never(directory, file_name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                init_with_writer!(writer).map(|()| Some(guard))
            }
        }
    }
}
