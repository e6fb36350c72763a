//! Low-level HTTP plumbing for the Bot API.

use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use baleen_types::ApiResponse;

use crate::error::{ClientError, ClientResult};

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://tapi.bale.ai";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes Bot API calls against `{base}/bot{token}/{method}`.
///
/// All calls decode into the standard envelope first; an error envelope
/// becomes [`ClientError::Api`] regardless of the HTTP status line.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Posts a JSON body and decodes the enveloped result.
    pub async fn post_json<P, T>(&self, method: &str, params: &P) -> ClientResult<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method = %method, "API call");
        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Like [`post_json`](Self::post_json) with a per-request timeout.
    ///
    /// Long-poll calls hold the connection open longer than the client's
    /// default allows.
    pub async fn post_json_with_timeout<P, T>(
        &self,
        method: &str,
        params: &P,
        timeout: Duration,
    ) -> ClientResult<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method = %method, timeout_secs = timeout.as_secs(), "API call");
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(params)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Posts a multipart form and decodes the enveloped result.
    pub async fn post_multipart<T>(&self, method: &str, form: Form) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        debug!(method = %method, "API upload");
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let bytes = response.bytes().await?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        envelope.into_result().map_err(ClientError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_shape() {
        let client = ApiClient::new("123:abc", "https://tapi.bale.ai/", DEFAULT_TIMEOUT);
        assert_eq!(
            client.method_url("getMe"),
            "https://tapi.bale.ai/bot123:abc/getMe"
        );
    }
}
