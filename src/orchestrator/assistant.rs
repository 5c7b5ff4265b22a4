use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::dispatch::chain::{ChainLink, ChainOutcome, Gate, ProviderChain};
use crate::dispatch::http::HttpDispatch;
use crate::dispatch::{ProviderAttempt, saw_rate_limit};
use crate::error::ApiError;
use crate::fallback::OFFLINE_PROVIDER;
use crate::fallback::knowledge::KnowledgeBase;
use crate::limits::cooldown::CooldownTracker;
use crate::limits::rate_limit::{Admission, RateLimiter};
use crate::model::AssistantRequest;
use crate::providers::gemini::{GEMINI_PROVIDER, Gemini};
use crate::providers::openai::{FREE_CHAT_PROVIDER, OPENAI_PROVIDER, OpenAiChat};

#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub message: String,
    pub provider: String,
    pub used_fallback: bool,
    pub rate_limited: bool,
    /// Knowledge topics that produced an offline reply.
    pub topics: Vec<String>,
    pub attempts: Vec<ProviderAttempt>,
}

/// The caller exceeded the assistant request quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttled {
    pub retry_after: Duration,
    pub window: Duration,
}

impl From<Throttled> for ApiError {
    fn from(t: Throttled) -> Self {
        ApiError::Throttled {
            retry_after: t.retry_after,
            window: t.window,
        }
    }
}

pub struct AssistantOrchestrator {
    chain: ProviderChain<AssistantRequest, String>,
    knowledge: Arc<KnowledgeBase>,
    limiter: Arc<RateLimiter>,
    delay: Duration,
}

impl AssistantOrchestrator {
    pub fn new(
        chain: ProviderChain<AssistantRequest, String>,
        knowledge: Arc<KnowledgeBase>,
        limiter: Arc<RateLimiter>,
        delay: Duration,
    ) -> Self {
        Self {
            chain,
            knowledge,
            limiter,
            delay,
        }
    }

    /// Standard chain: OpenAI, Gemini, then the free-tier model only when
    /// Gemini itself reported overload or a server error.
    pub fn from_config(
        config: &Config,
        http: HttpDispatch,
        cooldowns: Arc<CooldownTracker>,
        knowledge: Arc<KnowledgeBase>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let endpoints = &config.endpoints;
        let timeout = config.provider_timeout;
        let cooldown = |id: &str| config.cooldown.for_provider(id);

        let chain = ProviderChain::<AssistantRequest, String>::new("assistant", cooldowns)
            .link(
                ChainLink::new(OpenAiChat::openai(
                    http.clone(),
                    &endpoints.openai,
                    config.openai_api_key.clone(),
                    &config.openai_model,
                    timeout,
                ))
                .with_cooldown(cooldown(OPENAI_PROVIDER)),
            )
            .link(
                ChainLink::new(Gemini::new(
                    http.clone(),
                    &endpoints.gemini,
                    config.gemini_api_key.clone(),
                    &config.gemini_model,
                    timeout,
                ))
                .with_cooldown(cooldown(GEMINI_PROVIDER)),
            )
            .link(
                ChainLink::new(OpenAiChat::free_tier(
                    http,
                    &endpoints.free_chat,
                    &config.free_chat_model,
                    timeout,
                ))
                .gated(Gate::AfterOverload)
                .with_cooldown(cooldown(FREE_CHAT_PROVIDER)),
            );

        Self::new(chain, knowledge, limiter, config.chatbot.delay)
    }

    pub fn provider_order(&self) -> Vec<&str> {
        self.chain.order()
    }

    /// Rate-limit check only; `reply` calls this first.
    pub fn admit(&self, client_key: &str) -> Result<(), Throttled> {
        match self.limiter.admit(client_key) {
            Admission::Allowed { .. } => Ok(()),
            Admission::Denied { retry_after } => Err(Throttled {
                retry_after,
                window: self.limiter.window(),
            }),
        }
    }

    /// Throttled callers are rejected before any provider is contacted.
    /// Admitted callers always get a reply, offline if need be.
    pub async fn reply(
        &self,
        client_key: &str,
        req: &AssistantRequest,
    ) -> Result<AssistantReply, Throttled> {
        self.admit(client_key)?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let reply = match self.chain.run(req).await {
            ChainOutcome::Success {
                response,
                provider,
                attempts,
            } => AssistantReply {
                message: response.trim().to_string(),
                provider,
                used_fallback: false,
                rate_limited: false,
                topics: Vec::new(),
                attempts,
            },
            ChainOutcome::Exhausted { attempts } => {
                let answer = self.knowledge.answer(&req.message);
                let rate_limited = saw_rate_limit(&attempts);
                tracing::info!(topics = ?answer.topics, rate_limited, "using offline assistant reply");
                AssistantReply {
                    message: answer.text,
                    provider: OFFLINE_PROVIDER.to_string(),
                    used_fallback: true,
                    rate_limited,
                    topics: answer.topics,
                    attempts,
                }
            }
        };

        Ok(reply)
    }
}
