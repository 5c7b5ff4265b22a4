use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::dispatch::Provider;
use crate::dispatch::http::{HttpDispatch, non_empty};
use crate::error::ProviderError;
use crate::model::AssistantRequest;
use crate::providers::prompts;

pub const OPENAI_PROVIDER: &str = "openai";
pub const FREE_CHAT_PROVIDER: &str = "free-chat";

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f64 = 0.7;

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// OpenAI-compatible chat completion endpoint. Used twice in the assistant
/// chain: the keyed primary and a keyless free-tier mirror.
pub struct OpenAiChat {
    id: &'static str,
    http: HttpDispatch,
    url: String,
    api_key: Option<String>,
    requires_key: bool,
    model: String,
    timeout: Duration,
}

impl OpenAiChat {
    pub fn openai(
        http: HttpDispatch,
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            id: OPENAI_PROVIDER,
            http,
            url: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            requires_key: true,
            model: model.to_string(),
            timeout,
        }
    }

    /// Keyless endpoint; `url` is the full completions URL.
    pub fn free_tier(http: HttpDispatch, url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            id: FREE_CHAT_PROVIDER,
            http,
            url: url.to_string(),
            api_key: None,
            requires_key: false,
            model: model.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl Provider<AssistantRequest, String> for OpenAiChat {
    fn id(&self) -> &str {
        self.id
    }

    fn is_configured(&self) -> bool {
        !self.requires_key || self.api_key.is_some()
    }

    async fn attempt(&self, req: &AssistantRequest) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompts::assistant_system_prompt(req)},
                {"role": "user", "content": req.message},
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        let mut request = self.http.client().post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let completion: ChatCompletion = self.http.execute_json(self.id, request, self.timeout).await?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);

        non_empty(self.id, text, "choices[0].message.content")
    }
}
