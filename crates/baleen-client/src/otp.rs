//! OTP delivery sub-client.
//!
//! Talks to the separate OTP service rather than the Bot API: an OAuth2
//! client-credentials token endpoint plus a single send endpoint. The access
//! token is cached and refreshed shortly before it expires.

use std::time::{Duration, Instant};

use reqwest::{Client, ClientBuilder, StatusCode};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{OtpError, OtpResult};

/// Default OTP service endpoint.
pub const DEFAULT_OTP_BASE_URL: &str = "https://safir.bale.ai";

/// Refresh the token this long before the server-side expiry.
const TOKEN_EXPIRY_SLACK: u64 = 30;

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Client for the OTP service.
pub struct OtpClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl OtpClient {
    /// Creates a client against the default endpoint.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::with_base_url(client_id, client_secret, DEFAULT_OTP_BASE_URL)
    }

    /// Creates a client against a custom endpoint.
    pub fn with_base_url(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: Mutex::new(None),
        }
    }

    /// Normalizes a phone number to international digits.
    ///
    /// Everything but digits is stripped; `0XXXXXXXXXX` and bare ten-digit
    /// numbers gain the `98` country prefix. Anything else passes through
    /// unchanged for the server to judge.
    pub fn normalize_phone(phone: &str) -> String {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == 11 && digits.starts_with('0') {
            format!("98{}", &digits[1..])
        } else if digits.len() == 10 {
            format!("98{digits}")
        } else {
            digits
        }
    }

    /// Sends a one-time password to a phone number.
    pub async fn send_otp(&self, phone: &str, code: u32) -> OtpResult<()> {
        let token = self.access_token().await?;
        let payload = json!({
            "phone": Self::normalize_phone(phone),
            "otp": code,
        });

        let response = self
            .client
            .post(format!("{}/api/v2/send_otp", self.base_url))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = Self::json_body(status, response).await?;
        if status.is_success() {
            debug!(status = status.as_u16(), "OTP sent");
            Ok(())
        } else {
            Err(Self::send_error(status, &body))
        }
    }

    /// Returns a valid access token, fetching a fresh one when the cached
    /// token is absent or stale.
    async fn access_token(&self) -> OtpResult<String> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref()
            && Instant::now() < cached.expires_at
        {
            return Ok(cached.access_token.clone());
        }

        let fresh = self.fetch_token().await?;
        let access_token = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(access_token)
    }

    async fn fetch_token(&self) -> OtpResult<CachedToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", "read"),
        ];

        let response = self
            .client
            .post(format!("{}/api/v2/auth/token", self.base_url))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = Self::json_body(status, response).await?;
        if !status.is_success() {
            return Err(Self::token_error(status, &body));
        }

        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| OtpError::Unexpected {
                status: status.as_u16(),
                message: "token response carried no access_token".into(),
            })?
            .to_string();
        let expires_in = body
            .get("expires_in")
            .and_then(Value::as_f64)
            .map(|secs| secs as u64)
            .unwrap_or(3600);

        debug!(expires_in = expires_in, "OTP access token refreshed");
        Ok(CachedToken {
            access_token,
            expires_at: Instant::now()
                + Duration::from_secs(expires_in.saturating_sub(TOKEN_EXPIRY_SLACK)),
        })
    }

    /// Decodes a response body as JSON; anything else is an unexpected
    /// response even on a success status.
    async fn json_body(status: StatusCode, response: reqwest::Response) -> OtpResult<Value> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|_| OtpError::Unexpected {
            status: status.as_u16(),
            message: format!("non-JSON response: {text}"),
        })
    }

    fn token_error(status: StatusCode, body: &Value) -> OtpError {
        let message = Self::body_message(body);
        match status.as_u16() {
            401 => OtpError::InvalidClient,
            400 => OtpError::BadRequest(message),
            s if s >= 500 => OtpError::Server { status: s, message },
            s => OtpError::Unexpected { status: s, message },
        }
    }

    fn send_error(status: StatusCode, body: &Value) -> OtpError {
        let code = body.get("code").and_then(Value::as_i64);
        let message = Self::body_message(body);
        match (status.as_u16(), code) {
            (400, Some(8)) => OtpError::InvalidPhoneNumber,
            (400, Some(18)) => OtpError::RateLimitExceeded,
            (400, Some(20)) => OtpError::InsufficientBalance,
            (400, _) => OtpError::BadRequest(message),
            (402, _) => OtpError::InsufficientBalance,
            (404, _) => OtpError::UserNotFound,
            (s, _) if s >= 500 => OtpError::Server { status: s, message },
            (s, _) => OtpError::Unexpected { status: s, message },
        }
    }

    fn body_message(body: &Value) -> String {
        body.get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_normalization() {
        assert_eq!(OtpClient::normalize_phone("09123456789"), "989123456789");
        assert_eq!(OtpClient::normalize_phone("9123456789"), "989123456789");
        assert_eq!(OtpClient::normalize_phone("+98 912 345 6789"), "989123456789");
        assert_eq!(OtpClient::normalize_phone("0912-345-6789"), "989123456789");
        // Already prefixed or unrecognized lengths pass through.
        assert_eq!(OtpClient::normalize_phone("989123456789"), "989123456789");
        assert_eq!(OtpClient::normalize_phone("12345"), "12345");
    }

    #[test]
    fn test_token_error_mapping() {
        let body = json!({"message": "nope"});
        assert!(matches!(
            OtpClient::token_error(StatusCode::UNAUTHORIZED, &body),
            OtpError::InvalidClient
        ));
        assert!(matches!(
            OtpClient::token_error(StatusCode::BAD_REQUEST, &body),
            OtpError::BadRequest(_)
        ));
        assert!(matches!(
            OtpClient::token_error(StatusCode::BAD_GATEWAY, &body),
            OtpError::Server { status: 502, .. }
        ));
    }

    #[test]
    fn test_send_error_mapping() {
        let coded = |code: i64| json!({"code": code, "message": "m"});
        assert!(matches!(
            OtpClient::send_error(StatusCode::BAD_REQUEST, &coded(8)),
            OtpError::InvalidPhoneNumber
        ));
        assert!(matches!(
            OtpClient::send_error(StatusCode::BAD_REQUEST, &coded(18)),
            OtpError::RateLimitExceeded
        ));
        assert!(matches!(
            OtpClient::send_error(StatusCode::BAD_REQUEST, &coded(20)),
            OtpError::InsufficientBalance
        ));
        assert!(matches!(
            OtpClient::send_error(StatusCode::BAD_REQUEST, &json!({})),
            OtpError::BadRequest(_)
        ));
        assert!(matches!(
            OtpClient::send_error(StatusCode::PAYMENT_REQUIRED, &json!({})),
            OtpError::InsufficientBalance
        ));
        assert!(matches!(
            OtpClient::send_error(StatusCode::NOT_FOUND, &json!({})),
            OtpError::UserNotFound
        ));
        assert!(matches!(
            OtpClient::send_error(StatusCode::INTERNAL_SERVER_ERROR, &json!({})),
            OtpError::Server { status: 500, .. }
        ));
        assert!(matches!(
            OtpClient::send_error(StatusCode::IM_A_TEAPOT, &json!({})),
            OtpError::Unexpected { status: 418, .. }
        ));
    }
}
