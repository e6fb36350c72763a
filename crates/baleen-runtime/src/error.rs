//! Runtime error types.

use thiserror::Error;

use baleen_client::ClientError;

use crate::config::ConfigError;

/// Errors that can occur while starting or driving the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `start` was called while the runtime was already running.
    #[error("Runtime is already running")]
    AlreadyRunning,

    /// `getMe` returned an identity the runtime cannot poll with.
    #[error("Identity check returned an unusable bot identity")]
    IdentityCheck,

    /// An init callback failed during startup.
    #[error("Init callback failed: {0}")]
    Init(String),

    /// API client error.
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
