pub mod chain;
pub mod http;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ProviderError;

/// One external service able to fulfil a capability. A vendor serving two
/// capabilities (e.g. Gemini for translation and for chat) implements this
/// once per request type.
#[async_trait]
pub trait Provider<Req: Sync, Resp: Send>: Send + Sync {
    /// Stable identifier used in responses, logs and cooldown bookkeeping.
    fn id(&self) -> &str;

    /// False when a required credential is missing; the chain skips the
    /// provider without spending a call.
    fn is_configured(&self) -> bool {
        true
    }

    async fn attempt(&self, req: &Req) -> Result<Resp, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Timeout,
    RateLimited,
    Malformed,
    NetworkError,
    Rejected,
    /// Not attempted: missing credential or a closed gate.
    Skipped,
    /// Not attempted: the provider recently signalled overload.
    CoolingDown,
}

/// Trace entry for one step of a provider chain. Lives for one request.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderAttempt {
    pub provider: String,
    pub ordinal: usize,
    pub outcome: AttemptOutcome,
}

/// True if any provider in the trace signalled overload, now or recently
/// enough to still be cooling down.
pub fn saw_rate_limit(attempts: &[ProviderAttempt]) -> bool {
    attempts.iter().any(|a| {
        matches!(
            a.outcome,
            AttemptOutcome::RateLimited | AttemptOutcome::CoolingDown
        )
    })
}
