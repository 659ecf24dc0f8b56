// =========================
// tests/unit/rate_limit_tests.rs
// =========================
//! Unit tests for the request limiter and the login lockout
use std::net::IpAddr;
use std::time::Duration;

use backend_lib::auth::AuthRateLimiter;
use backend_lib::config::{AuthSettings, RateLimitSettings};
use backend_lib::middleware::rate_limit::RateLimiter;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[test]
fn test_default_lockout_threshold() {
    let limiter = AuthRateLimiter::from_settings(&AuthSettings::default());
    let client = ip("192.0.2.10");

    for _ in 0..4 {
        limiter.record_failed_attempt(client);
    }
    assert!(limiter.check_rate_limit(client));

    limiter.record_failed_attempt(client);
    assert!(!limiter.check_rate_limit(client));
}

#[test]
fn test_lockout_is_per_client() {
    let limiter = AuthRateLimiter::new(2, Duration::from_secs(300));
    limiter.record_failed_attempt(ip("192.0.2.1"));
    limiter.record_failed_attempt(ip("192.0.2.1"));

    assert!(!limiter.check_rate_limit(ip("192.0.2.1")));
    assert!(limiter.check_rate_limit(ip("192.0.2.2")));
    assert!(limiter.check_rate_limit(ip("2001:db8::1")));
}

#[test]
fn test_success_clears_lockout_tracking() {
    let limiter = AuthRateLimiter::new(3, Duration::from_secs(300));
    let client = ip("192.0.2.3");
    limiter.record_failed_attempt(client);
    limiter.record_failed_attempt(client);
    limiter.record_success(client);

    limiter.record_failed_attempt(client);
    limiter.record_failed_attempt(client);
    assert!(limiter.check_rate_limit(client));
}

#[test]
fn test_cleanup_keeps_active_lockouts() {
    let limiter = AuthRateLimiter::new(1, Duration::from_secs(300));
    limiter.record_failed_attempt(ip("192.0.2.4"));
    limiter.cleanup();
    assert_eq!(limiter.tracked_clients(), 1);
    assert!(!limiter.check_rate_limit(ip("192.0.2.4")));
}

#[test]
fn test_request_limiter_from_settings() {
    let limiter = RateLimiter::from_settings(&RateLimitSettings {
        window_secs: 60,
        max_requests: 3,
    });

    for _ in 0..3 {
        assert!(limiter.check("192.0.2.5"));
    }
    assert!(!limiter.check("192.0.2.5"));
    assert!(limiter.check("unknown"));
}

#[test]
fn test_request_limiter_concurrent_budget() {
    let limiter = std::sync::Arc::new(RateLimiter::new(Duration::from_secs(60), 50));
    let handles: Vec<_> = (0..10)
        .map(|_| {
            let limiter = limiter.clone();
            std::thread::spawn(move || (0..10).filter(|_| limiter.check("shared")).count())
        })
        .collect();

    let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(allowed, 50);
}
