//! Runtime lifecycle orchestration.
//!
//! The [`Runtime`] owns the API client, the dispatcher, and the poll loop.
//! Startup verifies the bot identity with `getMe` and runs registered init
//! callbacks before the first fetch. A stop request cancels the loop's
//! token; the loop drains its current batch and exits.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use baleen_core::{Dispatcher, MessageOptions};
//! use baleen_runtime::Runtime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut dispatcher = Dispatcher::new();
//!     dispatcher.on_message(MessageOptions::new().commands(["start"]), greet)?;
//!
//!     let runtime = Runtime::builder()
//!         .config_file("baleen.toml")
//!         .dispatcher(dispatcher)
//!         .build()?;
//!
//!     // Runs until Ctrl+C or SIGTERM
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::signal;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use baleen_client::Bot;
use baleen_core::Dispatcher;

use crate::config::{BaleenConfig, ConfigLoader};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::poller::{ApiUpdateSource, Poller, UpdateSource};

/// Lifecycle state of the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Never started.
    Idle,
    /// Poll loop is active.
    Running,
    /// Stop requested, the current batch is still draining.
    Stopping,
    /// Poll loop has exited.
    Stopped,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::Stopping => write!(f, "Stopping"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Async callback run during startup, after the identity check.
type InitCallback = Box<dyn Fn(Arc<Bot>) -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// The polling runtime.
///
/// Handlers are registered on a [`Dispatcher`] which is handed to the
/// runtime at construction time:
///
/// ```rust,ignore
/// let runtime = Runtime::builder()
///     .config_file("baleen.toml")
///     .dispatcher(dispatcher)
///     .build()?;
/// runtime.run().await?;
/// ```
pub struct Runtime {
    /// The configuration.
    config: BaleenConfig,
    /// The API client shared with handlers.
    bot: Arc<Bot>,
    /// The dispatch engine carrying handler registrations.
    dispatcher: Arc<Dispatcher>,
    /// Where the poll loop fetches batches from.
    source: Arc<dyn UpdateSource>,
    /// Startup callbacks, run in registration order.
    init_callbacks: Vec<InitCallback>,
    /// Current lifecycle state.
    state: Arc<RwLock<LifecycleState>>,
    /// Cancellation token of the active poll loop, replaced on each start.
    cancel: RwLock<CancellationToken>,
    /// Keeps the non-blocking log writer alive.
    _log_guard: Option<WorkerGuard>,
}

impl Runtime {
    /// Creates a runtime for the given token with default settings.
    pub fn new(token: impl Into<String>) -> Self {
        let mut config = BaleenConfig::default();
        config.bot.token = token.into();
        Self::from_config(config)
    }

    /// Creates a runtime builder for file or environment based configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from a configuration.
    ///
    /// Initializes logging according to the config. The worker guard of the
    /// file writer, when one is created, lives as long as the runtime.
    pub fn from_config(config: BaleenConfig) -> Self {
        let log_guard = logging::init_from_config(&config.logging);

        let bot = Arc::new(Bot::with_options(
            config.bot.token.clone(),
            config.bot.base_url.clone(),
            config.bot.request_timeout(),
        ));

        let dispatcher = Dispatcher::new()
            .with_concurrency_limit(config.polling.concurrency_limit)
            .with_retry_policy(config.retry.handler_policy());

        info!(
            base_url = %config.bot.base_url,
            polling_limit = config.polling.limit,
            "Runtime initialized from configuration"
        );

        Self {
            source: Arc::new(ApiUpdateSource::new(Arc::clone(&bot))),
            bot,
            dispatcher: Arc::new(dispatcher),
            config,
            init_callbacks: Vec::new(),
            state: Arc::new(RwLock::new(LifecycleState::Idle)),
            cancel: RwLock::new(CancellationToken::new()),
            _log_guard: log_guard,
        }
    }

    /// Replaces the dispatcher carrying the handler registrations.
    ///
    /// Call before `start`; a dispatcher swapped in later is not picked up
    /// by an already-running loop.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Arc::new(dispatcher);
        self
    }

    /// Replaces the update source the poll loop fetches from.
    pub fn with_update_source(mut self, source: Arc<dyn UpdateSource>) -> Self {
        self.source = source;
        self
    }

    /// Registers an async init callback.
    ///
    /// Callbacks run sequentially during startup, after the identity check
    /// and before the first fetch. A failing callback aborts startup.
    pub fn on_init<F, Fut>(&mut self, callback: F)
    where
        F: Fn(Arc<Bot>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        self.init_callbacks
            .push(Box::new(move |bot| Box::pin(callback(bot))));
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &BaleenConfig {
        &self.config
    }

    /// Returns the API client.
    pub fn bot(&self) -> &Arc<Bot> {
        &self.bot
    }

    /// Returns the current lifecycle state.
    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Returns whether the poll loop is active.
    pub async fn is_running(&self) -> bool {
        matches!(self.state().await, LifecycleState::Running)
    }

    /// Starts the runtime and drives the poll loop until a stop request.
    ///
    /// Refuses when already running. An identity check failure or a failing
    /// init callback aborts startup and leaves the runtime idle.
    pub async fn start(&self) -> RuntimeResult<()> {
        {
            let mut state = self.state.write().await;
            match *state {
                LifecycleState::Running | LifecycleState::Stopping => {
                    warn!("Runtime is already running");
                    return Err(RuntimeError::AlreadyRunning);
                }
                LifecycleState::Idle | LifecycleState::Stopped => {
                    *state = LifecycleState::Running;
                }
            }
        }

        // Fresh token per start so a stopped runtime can start again
        let token = CancellationToken::new();
        *self.cancel.write().await = token.clone();

        if let Err(e) = self.startup_checks().await {
            *self.state.write().await = LifecycleState::Idle;
            return Err(e);
        }

        let poller = Poller::new(
            Arc::clone(&self.source),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.bot),
            self.config.retry.fetch_policy(),
            self.config.polling.limit,
            self.config.polling.timeout_secs,
            token,
        );
        poller.run().await;

        *self.state.write().await = LifecycleState::Stopped;
        info!("Runtime stopped");
        Ok(())
    }

    /// Verifies the bot identity and runs the init callbacks.
    async fn startup_checks(&self) -> RuntimeResult<()> {
        let me = self.bot.get_me().await?;
        if !me.is_usable() {
            return Err(RuntimeError::IdentityCheck);
        }

        let bot_name = me.username.unwrap_or_else(|| me.id.to_string());
        info!(bot_id = me.id, bot_name = %bot_name, "Identity confirmed");
        self.dispatcher.set_bot_name(bot_name);

        for (index, callback) in self.init_callbacks.iter().enumerate() {
            callback(Arc::clone(&self.bot)).await.map_err(|message| {
                warn!(index, %message, "Init callback failed, aborting startup");
                RuntimeError::Init(message)
            })?;
        }

        Ok(())
    }

    /// Requests a graceful stop.
    ///
    /// The poll loop finishes dispatching its current batch before exiting.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write().await;
            if *state != LifecycleState::Running {
                warn!(state = %*state, "Stop requested while not running");
                return;
            }
            *state = LifecycleState::Stopping;
        }

        info!("Stop requested");
        self.cancel.read().await.cancel();
    }

    /// Runs the runtime until a shutdown signal is received.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.run_until(self.wait_for_shutdown()).await
    }

    /// Runs the runtime until the given future resolves, then stops
    /// gracefully.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let run_loop = self.start();
        tokio::pin!(run_loop);

        tokio::select! {
            result = &mut run_loop => result,
            _ = shutdown => {
                self.stop().await;
                run_loop.await
            }
        }
    }

    /// Waits for shutdown signals (Ctrl+C or SIGTERM).
    async fn wait_for_shutdown(&self) {
        #[cfg(unix)]
        {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to register SIGTERM handler");

            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
            info!("Received Ctrl+C, shutting down");
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`Runtime`] from file and environment
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = Runtime::builder()
///     .config_file("config/baleen.toml")
///     .dispatcher(dispatcher)
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    dispatcher: Option<Dispatcher>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            dispatcher: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: BaleenConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Sets the dispatcher carrying the handler registrations.
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<Runtime> {
        let config = self.config_loader.load()?;
        let mut runtime = Runtime::from_config(config);
        if let Some(dispatcher) = self.dispatcher {
            runtime = runtime.with_dispatcher(dispatcher);
        }
        Ok(runtime)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_runtime() -> Runtime {
        Runtime::new("42:test-token")
    }

    #[tokio::test]
    async fn test_new_runtime_is_idle() {
        let runtime = test_runtime();

        assert_eq!(runtime.state().await, LifecycleState::Idle);
        assert!(!runtime.is_running().await);
    }

    #[tokio::test]
    async fn test_start_refuses_while_running() {
        let runtime = test_runtime();
        *runtime.state.write().await = LifecycleState::Running;

        let result = runtime.start().await;

        assert!(matches!(result, Err(RuntimeError::AlreadyRunning)));
        assert_eq!(runtime.state().await, LifecycleState::Running);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_a_no_op() {
        let runtime = test_runtime();
        runtime.stop().await;

        assert_eq!(runtime.state().await, LifecycleState::Idle);
        assert!(!runtime.cancel.read().await.is_cancelled());
    }

    #[tokio::test]
    async fn test_builder_merges_programmatic_config() {
        let mut overrides = BaleenConfig::default();
        overrides.bot.token = "42:test-token".to_string();
        overrides.polling.timeout_secs = 5;

        let runtime = Runtime::builder()
            .search_path(std::env::temp_dir().join("baleen-no-such-dir"))
            .without_env()
            .merge(overrides)
            .build()
            .unwrap();

        assert_eq!(runtime.config().bot.token, "42:test-token");
        assert_eq!(runtime.config().polling.timeout_secs, 5);
        assert_eq!(runtime.bot().base_url(), "https://tapi.bale.ai");
    }

    #[tokio::test]
    async fn test_builder_rejects_missing_token() {
        let result = Runtime::builder()
            .search_path(std::env::temp_dir().join("baleen-no-such-dir"))
            .without_env()
            .build();

        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }
}
