use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::dispatch::Provider;
use crate::dispatch::http::{HttpDispatch, non_empty};
use crate::error::ProviderError;
use crate::model::TranslationRequest;

pub const MYMEMORY_PROVIDER: &str = "mymemory";

/// MyMemory answers 200 and puts quota warnings in the translated text.
const QUOTA_WARNING: &str = "MYMEMORY WARNING";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<ResponseData>,
    /// Sent as a number or a numeric string depending on the error path.
    response_status: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

fn status_code(value: &serde_json::Value) -> Option<u16> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Keyless machine translation: `GET /get?q=..&langpair=en|hi`.
pub struct MyMemory {
    http: HttpDispatch,
    url: String,
    timeout: Duration,
}

impl MyMemory {
    pub fn new(http: HttpDispatch, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            url: format!("{}/get", base_url.trim_end_matches('/')),
            timeout,
        }
    }
}

#[async_trait]
impl Provider<TranslationRequest, String> for MyMemory {
    fn id(&self) -> &str {
        MYMEMORY_PROVIDER
    }

    async fn attempt(&self, req: &TranslationRequest) -> Result<String, ProviderError> {
        let langpair = format!("{}|{}", req.from.code(), req.to.code());
        let request = self
            .http
            .client()
            .get(&self.url)
            .query(&[("q", req.text.as_str()), ("langpair", langpair.as_str())]);

        let response: MyMemoryResponse = self
            .http
            .execute_json(MYMEMORY_PROVIDER, request, self.timeout)
            .await?;

        match response.response_status.as_ref().and_then(status_code) {
            Some(429) => {
                return Err(ProviderError::RateLimited {
                    provider: MYMEMORY_PROVIDER.to_string(),
                });
            }
            Some(status) if !(200..300).contains(&status) => {
                return Err(ProviderError::Rejected {
                    provider: MYMEMORY_PROVIDER.to_string(),
                    status,
                });
            }
            _ => {}
        }

        let text = non_empty(
            MYMEMORY_PROVIDER,
            response.response_data.and_then(|d| d.translated_text),
            "responseData.translatedText",
        )?;

        if text.starts_with(QUOTA_WARNING) {
            return Err(ProviderError::RateLimited {
                provider: MYMEMORY_PROVIDER.to_string(),
            });
        }

        Ok(text)
    }
}
