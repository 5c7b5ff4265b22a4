use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by client identity.
///
/// Entries are created on first use and reset once their window has passed.
/// Nothing evicts stale keys; the map lives as long as the process. This is a
/// best-effort guard against bursts, not a security control.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn admit(&self, key: &str) -> Admission {
        self.admit_at(key, Instant::now())
    }

    pub fn admit_at(&self, key: &str, now: Instant) -> Admission {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let entry = entries.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            reset_at: now + self.window,
        });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }

        if entry.count >= self.max_requests {
            let retry_after = entry.reset_at.saturating_duration_since(now);
            tracing::warn!(
                client = key,
                retry_after_ms = retry_after.as_millis() as u64,
                "rate limit exceeded"
            );
            return Admission::Denied { retry_after };
        }

        entry.count += 1;
        Admission::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }

    /// Number of client keys currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
