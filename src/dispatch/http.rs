use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;

pub const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024; // 2MB

/// Cap on how much of an error body is echoed into logs.
const ERROR_PREVIEW_BYTES: usize = 200;

/// Shared HTTP client for every provider. Cloning is cheap (the underlying
/// connection pool is reference counted).
#[derive(Clone)]
pub struct HttpDispatch {
    client: Client,
}

impl Default for HttpDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDispatch {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .user_agent(concat!("travelmate/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("custom HTTP client failed to build ({e}), using defaults");
                Client::new()
            });

        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send a prepared request with a hard timeout and classify the outcome.
    ///
    /// - 429 maps to `RateLimited`
    /// - 5xx maps to `Unavailable` with the status attached
    /// - any other non-2xx maps to `Rejected`
    /// - connect/DNS failures map to `Unavailable` without a status
    /// - bodies larger than `MAX_RESPONSE_BYTES` are `Malformed`
    pub async fn execute(
        &self,
        provider: &str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Vec<u8>, ProviderError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_transport(provider, e, timeout))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: provider.to_string(),
            });
        }

        if status.is_server_error() {
            let body = response.bytes().await.unwrap_or_default();
            let preview = String::from_utf8_lossy(&body[..body.len().min(ERROR_PREVIEW_BYTES)]);
            return Err(ProviderError::Unavailable {
                provider: provider.to_string(),
                message: format!("{status}: {preview}"),
                status: Some(status.as_u16()),
            });
        }

        if !status.is_success() {
            return Err(ProviderError::Rejected {
                provider: provider.to_string(),
                status: status.as_u16(),
            });
        }

        // Refuse oversized bodies before buffering when the server announces them.
        if response
            .content_length()
            .is_some_and(|len| len as usize > MAX_RESPONSE_BYTES)
        {
            return Err(ProviderError::malformed(provider, "response too large"));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_transport(provider, e, timeout))?;

        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(ProviderError::malformed(
                provider,
                format!(
                    "response too large: {} bytes (max {})",
                    bytes.len(),
                    MAX_RESPONSE_BYTES
                ),
            ));
        }

        Ok(bytes.to_vec())
    }

    /// `execute` followed by JSON decoding; a body that does not match `T`
    /// is `Malformed`, never a success.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        provider: &str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<T, ProviderError> {
        let bytes = self.execute(provider, request, timeout).await?;
        decode_json(provider, &bytes)
    }
}

pub fn decode_json<T: DeserializeOwned>(provider: &str, bytes: &[u8]) -> Result<T, ProviderError> {
    serde_json::from_slice(bytes)
        .map_err(|e| ProviderError::malformed(provider, format!("failed to parse response: {e}")))
}

fn classify_transport(provider: &str, e: reqwest::Error, timeout: Duration) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout.as_millis() as u64)
    } else if e.is_decode() || e.is_body() {
        ProviderError::malformed(provider, format!("failed to read response body: {e}"))
    } else {
        ProviderError::Unavailable {
            provider: provider.to_string(),
            message: e.to_string(),
            status: e.status().map(|s| s.as_u16()),
        }
    }
}

/// Returns the trimmed text if it is non-empty. Providers use this to turn
/// "200 OK with an empty field" into a failure instead of a blank answer.
pub fn non_empty(provider: &str, text: Option<String>, field: &str) -> Result<String, ProviderError> {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ProviderError::malformed(provider, format!("{field} is empty or missing")))
}
