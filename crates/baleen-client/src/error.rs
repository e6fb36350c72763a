//! Client error types.

use thiserror::Error;

use baleen_types::ResponseError;

/// Errors that can occur while calling the Bot API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network-level request failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error envelope.
    #[error("API error{}: {description}", .code.map(|c| format!(" {c}")).unwrap_or_default())]
    Api {
        code: Option<i64>,
        description: String,
        /// Seconds to wait, when the server sent a rate-limit hint.
        retry_after: Option<u64>,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A successful envelope arrived without its payload.
    #[error("OK response carried no result")]
    MissingResult,

    /// The caller supplied an argument the API would reject.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reading a local file for upload failed.
    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Creates an invalid input error with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// The API error code, if this is an API-level rejection.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }

    /// The server's rate-limit hint in seconds, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Api { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<ResponseError> for ClientError {
    fn from(err: ResponseError) -> Self {
        match err {
            ResponseError::Api {
                code,
                description,
                retry_after,
            } => Self::Api {
                code,
                description,
                retry_after,
            },
            ResponseError::MissingResult => Self::MissingResult,
        }
    }
}

/// Result type for Bot API calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors from the OTP sub-client.
#[derive(Error, Debug)]
pub enum OtpError {
    /// Network-level request failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The client credentials were rejected.
    #[error("Invalid client credentials")]
    InvalidClient,

    /// The token request was malformed.
    #[error("Bad token request: {0}")]
    BadRequest(String),

    /// The phone number was rejected.
    #[error("Invalid phone number")]
    InvalidPhoneNumber,

    /// Too many OTP sends in a short window.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The account balance does not cover the send.
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// The phone number has no account on the platform.
    #[error("User not found")]
    UserNotFound,

    /// The service itself failed.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any response the client does not recognize.
    #[error("Unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },
}

/// Result type for OTP operations.
pub type OtpResult<T> = Result<T, OtpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_accessors() {
        let err = ClientError::Api {
            code: Some(429),
            description: "Too Many Requests".into(),
            retry_after: Some(5),
        };
        assert_eq!(err.code(), Some(429));
        assert_eq!(err.retry_after(), Some(5));
        assert_eq!(err.to_string(), "API error 429: Too Many Requests");

        let err = ClientError::invalid_input("empty id");
        assert_eq!(err.code(), None);
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_response_error_conversion() {
        let err: ClientError = ResponseError::MissingResult.into();
        assert!(matches!(err, ClientError::MissingResult));
    }
}
