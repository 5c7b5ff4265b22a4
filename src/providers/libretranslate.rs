use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::dispatch::Provider;
use crate::dispatch::http::{HttpDispatch, non_empty};
use crate::error::ProviderError;
use crate::model::TranslationRequest;

pub const LIBRETRANSLATE_PROVIDER: &str = "libretranslate";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreResponse {
    translated_text: Option<String>,
    error: Option<String>,
}

/// LibreTranslate `POST /translate` with a JSON body.
pub struct LibreTranslate {
    http: HttpDispatch,
    url: String,
    timeout: Duration,
}

impl LibreTranslate {
    pub fn new(http: HttpDispatch, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            url: format!("{}/translate", base_url.trim_end_matches('/')),
            timeout,
        }
    }
}

#[async_trait]
impl Provider<TranslationRequest, String> for LibreTranslate {
    fn id(&self) -> &str {
        LIBRETRANSLATE_PROVIDER
    }

    async fn attempt(&self, req: &TranslationRequest) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "q": req.text,
            "source": req.from.code(),
            "target": req.to.code(),
            "format": "text",
        });
        let request = self.http.client().post(&self.url).json(&body);

        let response: LibreResponse = self
            .http
            .execute_json(LIBRETRANSLATE_PROVIDER, request, self.timeout)
            .await?;

        if let Some(error) = response.error {
            return Err(ProviderError::malformed(LIBRETRANSLATE_PROVIDER, error));
        }

        non_empty(LIBRETRANSLATE_PROVIDER, response.translated_text, "translatedText")
    }
}
