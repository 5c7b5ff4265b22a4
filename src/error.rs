use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::dispatch::AttemptOutcome;

/// Failure of a single provider call. Orchestrators branch on the variant
/// (gating, cooldown), so every transport and decode failure is classified
/// here rather than passed through as an opaque error.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("timeout after {0}ms")]
    Timeout(u64),

    #[error("rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("malformed response from {provider}: {message}")]
    Malformed { provider: String, message: String },

    #[error("{provider} unavailable: {message}")]
    Unavailable {
        provider: String,
        message: String,
        status: Option<u16>,
    },

    #[error("{provider} rejected the request with status {status}")]
    Rejected { provider: String, status: u16 },

    #[error("{provider} is not configured")]
    NotConfigured { provider: String },
}

impl ProviderError {
    pub fn malformed(provider: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Attempt outcome recorded in the chain trace for this failure.
    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            Self::Timeout(_) => AttemptOutcome::Timeout,
            Self::RateLimited { .. } => AttemptOutcome::RateLimited,
            Self::Malformed { .. } => AttemptOutcome::Malformed,
            Self::Unavailable { .. } => AttemptOutcome::NetworkError,
            Self::Rejected { .. } => AttemptOutcome::Rejected,
            Self::NotConfigured { .. } => AttemptOutcome::Skipped,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// True for overload (429) and server-side (5xx) failures. Network
    /// errors without a status do not count: the host may simply be down.
    pub fn is_overload_or_server_error(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Unavailable { status, .. } => status.is_some_and(|s| s >= 500),
            _ => false,
        }
    }

    /// Sanitized message safe for logs shipped off-box and client payloads.
    /// Does not leak internal URLs or upstream error bodies.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout(ms) => format!("request timed out after {ms}ms"),
            Self::RateLimited { provider } => {
                format!("rate limited by {provider}, try again shortly")
            }
            Self::Malformed { provider, .. } => {
                format!("failed to parse response from {provider}")
            }
            Self::Unavailable {
                provider,
                status: Some(status),
                ..
            } => format!("{provider} returned server error {status}"),
            Self::Unavailable { provider, .. } => format!("{provider} is unreachable"),
            Self::Rejected { provider, status } => {
                format!("{provider} rejected the request ({status})")
            }
            Self::NotConfigured { provider } => format!("{provider} is not configured"),
        }
    }
}

/// Errors surfaced to HTTP clients. Provider failures for translation and the
/// assistant never reach this type: those degrade to a flagged fallback.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("too many requests")]
    Throttled { retry_after: Duration, window: Duration },

    #[error("all place data endpoints failed")]
    PlacesUnavailable,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::PlacesUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Throttled {
                retry_after,
                window,
            } => {
                let body = json!({
                    "success": false,
                    "error": "Too many requests. Please slow down and try again shortly.",
                    "rateLimited": true,
                    "retryAfterMs": retry_after.as_millis() as u64,
                    "windowMs": window.as_millis() as u64,
                });
                let mut response = (status, Json(body)).into_response();
                // Retry-After is whole seconds; round up so clients never retry early.
                let secs = retry_after.as_millis().div_ceil(1000).max(1);
                if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                response
            }
            other => {
                let message = match &other {
                    Self::InvalidInput(msg) => msg.clone(),
                    Self::PlacesUnavailable => "All place data endpoints failed".to_string(),
                    Self::NotFound(msg) => msg.clone(),
                    Self::NotConfigured(msg) => msg.clone(),
                    Self::Upstream(msg) => msg.clone(),
                    _ => "Internal server error".to_string(),
                };
                (status, Json(json!({ "success": false, "error": message }))).into_response()
            }
        }
    }
}
