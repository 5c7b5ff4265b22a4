use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::{ProviderAttempt, saw_rate_limit};
use crate::dispatch::chain::{ChainLink, ChainOutcome, ProviderChain};
use crate::dispatch::http::HttpDispatch;
use crate::fallback::OFFLINE_PROVIDER;
use crate::fallback::phrasebook::{MatchKind, Phrasebook};
use crate::limits::cooldown::CooldownTracker;
use crate::model::TranslationRequest;
use crate::providers::gemini::{GEMINI_PROVIDER, Gemini};
use crate::providers::libretranslate::{LIBRETRANSLATE_PROVIDER, LibreTranslate};
use crate::providers::lingva::{LINGVA_PROVIDER, Lingva};
use crate::providers::mymemory::{MYMEMORY_PROVIDER, MyMemory};

#[derive(Debug, Clone)]
pub struct Translation {
    pub text: String,
    pub provider: String,
    pub used_fallback: bool,
    /// Set when the offline answer was used and some provider had signalled
    /// overload, so clients can show a rate-limit specific notice.
    pub rate_limited: bool,
    /// Populated for offline answers only.
    pub match_kind: Option<MatchKind>,
    pub attempts: Vec<ProviderAttempt>,
}

pub struct TranslationOrchestrator {
    chain: ProviderChain<TranslationRequest, String>,
    phrasebook: Arc<Phrasebook>,
}

impl TranslationOrchestrator {
    pub fn new(chain: ProviderChain<TranslationRequest, String>, phrasebook: Arc<Phrasebook>) -> Self {
        Self { chain, phrasebook }
    }

    /// Standard chain: MyMemory, Gemini (keyed), LibreTranslate, Lingva.
    pub fn from_config(
        config: &Config,
        http: HttpDispatch,
        cooldowns: Arc<CooldownTracker>,
        phrasebook: Arc<Phrasebook>,
    ) -> Self {
        let endpoints = &config.endpoints;
        let timeout = config.provider_timeout;
        let cooldown = |id: &str| config.cooldown.for_provider(id);

        let chain = ProviderChain::<TranslationRequest, String>::new("translate", cooldowns)
            .link(
                ChainLink::new(MyMemory::new(http.clone(), &endpoints.mymemory, timeout))
                    .with_cooldown(cooldown(MYMEMORY_PROVIDER)),
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
                ChainLink::new(LibreTranslate::new(
                    http.clone(),
                    &endpoints.libretranslate,
                    timeout,
                ))
                .with_cooldown(cooldown(LIBRETRANSLATE_PROVIDER)),
            )
            .link(
                ChainLink::new(Lingva::new(http, &endpoints.lingva, timeout))
                    .with_cooldown(cooldown(LINGVA_PROVIDER)),
            );

        Self::new(chain, phrasebook)
    }

    pub fn provider_order(&self) -> Vec<&str> {
        self.chain.order()
    }

    /// Never fails: a fully exhausted chain still yields the phrasebook
    /// answer (or the input echoed back) flagged as a fallback.
    pub async fn translate(&self, req: &TranslationRequest) -> Translation {
        match self.chain.run(req).await {
            ChainOutcome::Success {
                response,
                provider,
                attempts,
            } => Translation {
                text: response,
                provider,
                used_fallback: false,
                rate_limited: false,
                match_kind: None,
                attempts,
            },
            ChainOutcome::Exhausted { attempts } => {
                let rate_limited = saw_rate_limit(&attempts);
                let offline = self.phrasebook.translate(&req.text, req.from, req.to);
                tracing::info!(
                    from = req.from.code(),
                    to = req.to.code(),
                    match_kind = ?offline.kind,
                    rate_limited,
                    "using offline translation"
                );
                Translation {
                    text: offline.text,
                    provider: OFFLINE_PROVIDER.to_string(),
                    used_fallback: true,
                    rate_limited,
                    match_kind: Some(offline.kind),
                    attempts,
                }
            }
        }
    }
}
