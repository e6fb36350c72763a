//! Error types for the baleen dispatch engine.

use thiserror::Error;

/// Errors that can occur during context extraction.
///
/// Returned by [`FromContext`](crate::extract::FromContext) implementations
/// when a handler parameter cannot be produced from the current update. The
/// dispatcher treats this as "handler does not apply" and skips the call
/// without logging anything louder than a debug line.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The update does not carry the payload the parameter asks for.
    #[error("update has no '{expected}' payload")]
    MissingPayload {
        /// Name of the missing payload kind.
        expected: &'static str,
    },

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors reported synchronously at handler registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A prebuilt filter and convenience options were supplied together.
    ///
    /// A registration must pick one style: either a ready [`Filter`] or the
    /// option set (`commands`, `pattern`, `content_types`, ...) that the
    /// registry combines into one. Mixing the two would make the effective
    /// match rule ambiguous, so it is rejected before the handler is stored.
    ///
    /// [`Filter`]: crate::filter::Filter
    #[error("Cannot combine a prebuilt filter with convenience options")]
    FilterConflict,
}

/// Result type for registration operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
