use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::{AttemptOutcome, Provider, ProviderAttempt, saw_rate_limit};
use crate::limits::cooldown::CooldownTracker;

/// Condition under which a link is attempted, evaluated against the failure
/// of the link immediately before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gate {
    #[default]
    Always,
    /// Only when the previous link failed with 429 or 5xx, or was skipped
    /// because it is still cooling down from an earlier 429.
    AfterOverload,
}

impl Gate {
    fn permits(self, previous_overloaded: bool) -> bool {
        match self {
            Gate::Always => true,
            Gate::AfterOverload => previous_overloaded,
        }
    }
}

pub struct ChainLink<Req: Sync, Resp: Send> {
    provider: Box<dyn Provider<Req, Resp>>,
    gate: Gate,
    cooldown: Option<Duration>,
}

impl<Req: Sync, Resp: Send> ChainLink<Req, Resp> {
    pub fn new(provider: impl Provider<Req, Resp> + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            gate: Gate::Always,
            cooldown: None,
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = gate;
        self
    }

    /// Skip this provider while it cools down, and start a cooldown of
    /// `duration` when it reports overload. `None` or zero disables both.
    pub fn with_cooldown(mut self, duration: Option<Duration>) -> Self {
        self.cooldown = duration.filter(|d| !d.is_zero());
        self
    }

    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }
}

/// Result of running a chain: either the first success, or every attempt
/// failed (or was skipped).
#[derive(Debug)]
pub enum ChainOutcome<Resp> {
    Success {
        response: Resp,
        provider: String,
        attempts: Vec<ProviderAttempt>,
    },
    Exhausted {
        attempts: Vec<ProviderAttempt>,
    },
}

impl<Resp> ChainOutcome<Resp> {
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            Self::Success { attempts, .. } | Self::Exhausted { attempts } => attempts,
        }
    }

    /// True if any provider in the chain signalled overload.
    pub fn saw_rate_limit(&self) -> bool {
        saw_rate_limit(self.attempts())
    }
}

/// Fixed, ordered list of providers for one capability. Attempts are strictly
/// sequential: each outcome decides whether the next link runs.
pub struct ProviderChain<Req: Sync, Resp: Send> {
    name: &'static str,
    links: Vec<ChainLink<Req, Resp>>,
    cooldowns: Arc<CooldownTracker>,
}

impl<Req: Sync, Resp: Send> ProviderChain<Req, Resp> {
    pub fn new(name: &'static str, cooldowns: Arc<CooldownTracker>) -> Self {
        Self {
            name,
            links: Vec::new(),
            cooldowns,
        }
    }

    pub fn link(mut self, link: ChainLink<Req, Resp>) -> Self {
        self.links.push(link);
        self
    }

    /// Provider ids in attempt order.
    pub fn order(&self) -> Vec<&str> {
        self.links.iter().map(|l| l.provider_id()).collect()
    }

    pub async fn run(&self, req: &Req) -> ChainOutcome<Resp> {
        let mut attempts = Vec::with_capacity(self.links.len());
        let mut previous_overloaded = false;

        for (ordinal, link) in self.links.iter().enumerate() {
            let id = link.provider.id();
            let skip = if !link.provider.is_configured() {
                Some((AttemptOutcome::Skipped, "not configured"))
            } else if !link.gate.permits(previous_overloaded) {
                Some((AttemptOutcome::Skipped, "gate closed"))
            } else if link.cooldown.is_some() && self.cooldowns.is_cooling_down(id) {
                Some((AttemptOutcome::CoolingDown, "cooling down"))
            } else {
                None
            };

            if let Some((outcome, reason)) = skip {
                tracing::debug!(chain = self.name, provider = id, reason, "skipping provider");
                attempts.push(ProviderAttempt {
                    provider: id.to_string(),
                    ordinal,
                    outcome,
                });
                previous_overloaded = outcome == AttemptOutcome::CoolingDown;
                continue;
            }

            match link.provider.attempt(req).await {
                Ok(response) => {
                    tracing::info!(chain = self.name, provider = id, ordinal, "provider succeeded");
                    attempts.push(ProviderAttempt {
                        provider: id.to_string(),
                        ordinal,
                        outcome: AttemptOutcome::Success,
                    });
                    return ChainOutcome::Success {
                        response,
                        provider: id.to_string(),
                        attempts,
                    };
                }
                Err(e) => {
                    let outcome = e.outcome();
                    tracing::warn!(
                        chain = self.name,
                        provider = id,
                        ordinal,
                        outcome = ?outcome,
                        "provider failed: {e}"
                    );
                    if e.is_rate_limited()
                        && let Some(duration) = link.cooldown
                    {
                        self.cooldowns.trigger(id, duration);
                    }
                    attempts.push(ProviderAttempt {
                        provider: id.to_string(),
                        ordinal,
                        outcome,
                    });
                    previous_overloaded = e.is_overload_or_server_error();
                }
            }
        }

        tracing::warn!(chain = self.name, "all providers exhausted");
        ChainOutcome::Exhausted { attempts }
    }
}
