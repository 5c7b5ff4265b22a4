use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::dispatch::Provider;
use crate::dispatch::http::{HttpDispatch, non_empty};
use crate::error::ProviderError;
use crate::model::{AssistantRequest, TranslationRequest};
use crate::providers::prompts;

pub const GEMINI_PROVIDER: &str = "gemini";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Google Gemini `generateContent`. Serves both the translation chain and
/// the assistant chain with a different prompt for each.
pub struct Gemini {
    http: HttpDispatch,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl Gemini {
    pub fn new(
        http: HttpDispatch,
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            timeout,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured {
                provider: GEMINI_PROVIDER.to_string(),
            })?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });
        let request = self
            .http
            .client()
            .post(url)
            .header("x-goog-api-key", key)
            .json(&body);

        let response: GenerateContentResponse = self
            .http
            .execute_json(GEMINI_PROVIDER, request, self.timeout)
            .await?;

        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ProviderError::malformed(
                GEMINI_PROVIDER,
                format!("prompt blocked: {reason}"),
            ));
        }

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            });

        non_empty(GEMINI_PROVIDER, text, "candidates[0].content.parts")
    }
}

#[async_trait]
impl Provider<TranslationRequest, String> for Gemini {
    fn id(&self) -> &str {
        GEMINI_PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.has_key()
    }

    async fn attempt(&self, req: &TranslationRequest) -> Result<String, ProviderError> {
        let text = self.generate(&prompts::translation_prompt(req)).await?;
        // Models sometimes wrap the answer in quotes despite the instruction.
        let unquoted = text.trim_matches(|c| c == '"' || c == '“' || c == '”').trim();
        non_empty(GEMINI_PROVIDER, Some(unquoted.to_string()), "translation")
    }
}

#[async_trait]
impl Provider<AssistantRequest, String> for Gemini {
    fn id(&self) -> &str {
        GEMINI_PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.has_key()
    }

    async fn attempt(&self, req: &AssistantRequest) -> Result<String, ProviderError> {
        self.generate(&prompts::assistant_prompt(req)).await
    }
}
