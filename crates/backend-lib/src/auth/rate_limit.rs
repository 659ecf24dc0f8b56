// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Lockout of clients that keep failing to log in.

use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AuthSettings;
use crate::metrics;

/// Entries older than this with no lockout are forgotten
const FAILURE_MEMORY: Duration = Duration::from_secs(24 * 60 * 60);

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct RateLimitEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires, if one is active
    lockout_expiry: Option<Instant>,
}

/// Rate limiter for authentication attempts
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    /// Map of IP addresses to rate limit entries
    attempts: Arc<DashMap<IpAddr, RateLimitEntry>>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::from_settings(&AuthSettings::default())
    }
}

impl AuthRateLimiter {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            settings.max_failed_logins,
            Duration::from_secs(settings.lockout_secs),
        )
    }

    /// Record a failed authentication attempt
    pub fn record_failed_attempt(&self, ip: IpAddr) {
        let now = Instant::now();

        let mut entry = self.attempts.entry(ip).or_insert_with(|| RateLimitEntry {
            failed_attempts: 0,
            last_failure: now,
            lockout_expiry: None,
        });

        // A served lockout starts the count afresh
        if matches!(entry.lockout_expiry, Some(expiry) if now >= expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts && entry.lockout_expiry.is_none() {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            metrics::record(metrics::AUTH_LOCKOUT);
            tracing::warn!(%ip, attempts = entry.failed_attempts, "client locked out after failed logins");
        }
    }

    /// Record a successful authentication
    pub fn record_success(&self, ip: IpAddr) {
        self.attempts.remove(&ip);
    }

    /// Check if an IP is allowed to attempt authentication
    pub fn check_rate_limit(&self, ip: IpAddr) -> bool {
        match self.attempts.get(&ip) {
            Some(entry) => !matches!(entry.lockout_expiry, Some(expiry) if Instant::now() < expiry),
            None => true,
        }
    }

    /// Clean up expired lockouts and stale failure counts
    pub fn cleanup(&self) {
        let now = Instant::now();

        self.attempts.retain(|_, entry| match entry.lockout_expiry {
            Some(expiry) => now < expiry,
            None => now.duration_since(entry.last_failure) < FAILURE_MEMORY,
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.attempts.len()
    }
}
