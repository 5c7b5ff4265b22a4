use std::sync::Arc;
use std::time::{Duration, Instant};

use travelmate::limits::cooldown::CooldownTracker;
use travelmate::limits::rate_limit::{Admission, RateLimiter};

#[test]
fn allows_up_to_max_then_denies_within_window() {
    let limiter = RateLimiter::new(Duration::from_secs(60), 3);
    let start = Instant::now();

    for expected_remaining in [2, 1, 0] {
        assert_eq!(
            limiter.admit_at("1.2.3.4", start),
            Admission::Allowed {
                remaining: expected_remaining
            }
        );
    }

    match limiter.admit_at("1.2.3.4", start + Duration::from_secs(20)) {
        Admission::Denied { retry_after } => assert_eq!(retry_after, Duration::from_secs(40)),
        other => panic!("expected denial, got {other:?}"),
    }
}

#[test]
fn window_resets_once_boundary_passes() {
    let limiter = RateLimiter::new(Duration::from_secs(60), 1);
    let start = Instant::now();

    assert!(matches!(limiter.admit_at("k", start), Admission::Allowed { .. }));
    assert!(matches!(
        limiter.admit_at("k", start + Duration::from_secs(59)),
        Admission::Denied { .. }
    ));
    assert!(matches!(
        limiter.admit_at("k", start + Duration::from_secs(60)),
        Admission::Allowed { remaining: 0 }
    ));
}

#[test]
fn keys_are_counted_independently() {
    let limiter = RateLimiter::new(Duration::from_secs(60), 1);
    let now = Instant::now();

    assert!(matches!(limiter.admit_at("a", now), Admission::Allowed { .. }));
    assert!(matches!(limiter.admit_at("b", now), Admission::Allowed { .. }));
    assert!(matches!(limiter.admit_at("a", now), Admission::Denied { .. }));
    assert_eq!(limiter.tracked_clients(), 2);
}

#[test]
fn concurrent_admissions_never_exceed_the_limit() {
    let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60), 10));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = limiter.clone();
            std::thread::spawn(move || {
                (0..10)
                    .filter(|_| matches!(limiter.admit("shared"), Admission::Allowed { .. }))
                    .count()
            })
        })
        .collect();

    let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(allowed, 10);
}

#[test]
fn cooldown_expires_and_is_never_shortened() {
    let tracker = CooldownTracker::new();
    let now = Instant::now();

    tracker.trigger_at("gemini", Duration::from_secs(30), now);
    tracker.trigger_at("gemini", Duration::from_secs(5), now);
    assert_eq!(
        tracker.remaining_at("gemini", now + Duration::from_secs(10)),
        Some(Duration::from_secs(20))
    );
    assert_eq!(tracker.remaining_at("gemini", now + Duration::from_secs(30)), None);
    assert_eq!(tracker.remaining_at("openai", now), None);
}

#[test]
fn cooldowns_are_per_provider() {
    let tracker = CooldownTracker::new();
    tracker.trigger("mymemory", Duration::from_secs(60));

    assert!(tracker.is_cooling_down("mymemory"));
    assert!(!tracker.is_cooling_down("lingva"));

    tracker.clear("mymemory");
    assert!(!tracker.is_cooling_down("mymemory"));
}
