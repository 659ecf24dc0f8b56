use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::auth::ClientIp;
use crate::config::RateLimitSettings;
use crate::{error::AppError, metrics, AppState};

/// Rate limit entry for a client
#[derive(Debug)]
struct RateLimitEntry {
    requests: u32,
    window_start: Instant,
}

/// Fixed-window request limiter keyed by client address
#[derive(Debug)]
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            entries: DashMap::new(),
            window,
            max_requests,
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(Duration::from_secs(settings.window_secs), settings.max_requests)
    }

    /// Count a request; false once the client has used up its window
    pub fn check(&self, key: &str) -> bool {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry {
                requests: 0,
                window_start: Instant::now(),
            });

        // Check if window has expired
        if entry.window_start.elapsed() > self.window {
            entry.requests = 0;
            entry.window_start = Instant::now();
        }

        if entry.requests >= self.max_requests {
            return false;
        }

        entry.requests += 1;
        true
    }

    /// Drop entries whose window has passed
    pub fn cleanup(&self) {
        let window = self.window;
        self.entries.retain(|_, entry| entry.window_start.elapsed() <= window);
    }
}

/// Rate limiter middleware
pub async fn rate_limit<S: Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    let key = ClientIp::from_parts(&parts, state.settings.server.trust_forwarded_headers)
        .0
        .map_or_else(|| "unknown".to_string(), |ip| ip.to_string());
    let request = Request::from_parts(parts, body);

    if !state.rate_limiter.check(&key) {
        metrics::record(metrics::RATE_LIMITED);
        tracing::debug!(client = %key, "request rate limit exceeded");
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}
