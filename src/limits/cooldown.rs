use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-provider cooldown deadlines. Owned by the application state and shared
/// (via `Arc`) with every provider chain, so tests can inject a fresh one.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    until: Mutex<HashMap<String, Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cooling_down(&self, provider: &str) -> bool {
        self.remaining_at(provider, Instant::now()).is_some()
    }

    /// Time left on the provider's cooldown, if any. Expired entries are dropped.
    pub fn remaining_at(&self, provider: &str, now: Instant) -> Option<Duration> {
        let mut until = self.lock();
        match until.get(provider).copied() {
            Some(deadline) if now < deadline => Some(deadline - now),
            Some(_) => {
                until.remove(provider);
                None
            }
            None => None,
        }
    }

    pub fn trigger(&self, provider: &str, duration: Duration) {
        self.trigger_at(provider, duration, Instant::now());
    }

    /// Start (or extend) a cooldown. An existing later deadline is kept.
    pub fn trigger_at(&self, provider: &str, duration: Duration, now: Instant) {
        let deadline = now + duration;
        let mut until = self.lock();
        let entry = until.entry(provider.to_string()).or_insert(deadline);
        if *entry < deadline {
            *entry = deadline;
        }
        tracing::info!(provider, cooldown_ms = duration.as_millis() as u64, "provider cooling down");
    }

    pub fn clear(&self, provider: &str) {
        self.lock().remove(provider);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        // A panic while holding the lock leaves the map consistent (single
        // insert/remove), so recover from poisoning instead of propagating.
        self.until.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_not_cooling_down() {
        let tracker = CooldownTracker::new();
        assert!(!tracker.is_cooling_down("gemini"));
    }

    #[test]
    fn cooldown_expires() {
        let tracker = CooldownTracker::new();
        let now = Instant::now();
        tracker.trigger_at("gemini", Duration::from_secs(30), now);

        assert!(tracker.remaining_at("gemini", now + Duration::from_secs(10)).is_some());
        assert!(tracker.remaining_at("gemini", now + Duration::from_secs(30)).is_none());
        // expired entry was dropped
        assert!(tracker.remaining_at("gemini", now).is_none());
    }

    #[test]
    fn trigger_never_shortens_existing_cooldown() {
        let tracker = CooldownTracker::new();
        let now = Instant::now();
        tracker.trigger_at("openai", Duration::from_secs(60), now);
        tracker.trigger_at("openai", Duration::from_secs(5), now);

        let left = tracker
            .remaining_at("openai", now + Duration::from_secs(10))
            .unwrap();
        assert_eq!(left, Duration::from_secs(50));
    }

    #[test]
    fn cooldowns_are_per_provider() {
        let tracker = CooldownTracker::new();
        tracker.trigger("gemini", Duration::from_secs(30));
        assert!(tracker.is_cooling_down("gemini"));
        assert!(!tracker.is_cooling_down("openai"));

        tracker.clear("gemini");
        assert!(!tracker.is_cooling_down("gemini"));
    }
}
