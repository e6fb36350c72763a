//! The API response envelope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extra hints attached to some error responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait before repeating a rate-limited call.
    #[serde(default)]
    pub retry_after: Option<u64>,
    /// The chat was migrated to this supergroup id.
    #[serde(default)]
    pub migrate_to_chat_id: Option<i64>,
}

/// Envelope every API method wraps its payload in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ResponseParameters>,
}

/// A decoded envelope that did not carry a usable payload.
#[derive(Debug, Clone, Error)]
pub enum ResponseError {
    /// The server rejected the call.
    #[error("api error {code:?}: {description}")]
    Api {
        code: Option<i64>,
        description: String,
        retry_after: Option<u64>,
    },
    /// `ok` was true but `result` was absent.
    #[error("ok response carried no result")]
    MissingResult,
}

impl<T> ApiResponse<T> {
    /// Checks if the API call was successful.
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// The rate-limit hint, when the server sent one.
    pub fn retry_after(&self) -> Option<u64> {
        self.parameters.as_ref().and_then(|p| p.retry_after)
    }

    /// Converts the envelope into a Result.
    ///
    /// A successful envelope without a `result` field is an error in its own
    /// right, never an empty payload.
    pub fn into_result(self) -> Result<T, ResponseError> {
        if self.ok {
            self.result.ok_or(ResponseError::MissingResult)
        } else {
            let retry_after = self.parameters.as_ref().and_then(|p| p.retry_after);
            Err(ResponseError::Api {
                code: self.error_code,
                description: self
                    .description
                    .unwrap_or_else(|| "unknown error".into()),
                retry_after,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_yields_payload() {
        let response: ApiResponse<i64> =
            serde_json::from_value(serde_json::json!({"ok": true, "result": 5})).unwrap();
        assert!(response.is_ok());
        assert_eq!(response.into_result().unwrap(), 5);
    }

    #[test]
    fn test_error_envelope_carries_retry_hint() {
        let response: ApiResponse<i64> = serde_json::from_value(serde_json::json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests",
            "parameters": {"retry_after": 7}
        }))
        .unwrap();
        assert_eq!(response.retry_after(), Some(7));
        match response.into_result() {
            Err(ResponseError::Api {
                code,
                description,
                retry_after,
            }) => {
                assert_eq!(code, Some(429));
                assert_eq!(description, "Too Many Requests");
                assert_eq!(retry_after, Some(7));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_ok_without_result_is_an_error() {
        let response: ApiResponse<i64> =
            serde_json::from_value(serde_json::json!({"ok": true})).unwrap();
        assert!(matches!(
            response.into_result(),
            Err(ResponseError::MissingResult)
        ));
    }
}
