use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::dispatch::Provider;
use crate::dispatch::http::{HttpDispatch, non_empty};
use crate::error::ProviderError;
use crate::model::TranslationRequest;

pub const LINGVA_PROVIDER: &str = "lingva";

#[derive(Deserialize)]
struct LingvaResponse {
    translation: Option<String>,
}

/// Lingva: everything lives in the path, `GET /api/v1/{source}/{target}/{text}`.
pub struct Lingva {
    http: HttpDispatch,
    base_url: String,
    timeout: Duration,
}

impl Lingva {
    pub fn new(http: HttpDispatch, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            timeout,
        }
    }

    /// Build the request URL; the text is percent-encoded as one segment.
    pub fn request_url(&self, req: &TranslationRequest) -> Result<Url, ProviderError> {
        let invalid = |message: String| ProviderError::Unavailable {
            provider: LINGVA_PROVIDER.to_string(),
            message,
            status: None,
        };

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("invalid endpoint {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| invalid(format!("endpoint cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1", req.from.code(), req.to.code(), req.text.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl Provider<TranslationRequest, String> for Lingva {
    fn id(&self) -> &str {
        LINGVA_PROVIDER
    }

    async fn attempt(&self, req: &TranslationRequest) -> Result<String, ProviderError> {
        let url = self.request_url(req)?;
        let request = self.http.client().get(url);

        let response: LingvaResponse = self
            .http
            .execute_json(LINGVA_PROVIDER, request, self.timeout)
            .await?;

        non_empty(LINGVA_PROVIDER, response.translation, "translation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_encodes_text_as_single_segment() {
        let lingva = Lingva::new(HttpDispatch::new(), "https://lingva.example/", Duration::from_secs(1));
        let req = TranslationRequest::new("where is/the beach?", "English", "Hindi");
        let url = lingva.request_url(&req).unwrap();
        assert_eq!(
            url.as_str(),
            "https://lingva.example/api/v1/en/hi/where%20is%2Fthe%20beach%3F"
        );
    }
}
