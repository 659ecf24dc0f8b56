// ============================
// visionassist-backend/src/lib.rs
// ============================
//! Core functionality of the `VisionAssist` API: accounts, bearer-token
//! authentication and the image-analysis history.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthRateLimiter, AuthService, CredentialHasher, DefaultAuth, TokenIssuer};
use crate::config::Settings;
use crate::middleware::rate_limit::RateLimiter;
use crate::storage::FlatFileStorage;

/// Version reported by the health endpoint
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Storage backend
    pub storage: S,
    /// Configuration settings
    pub settings: Arc<Settings>,
    /// Per-client request limiter
    pub rate_limiter: Arc<RateLimiter>,
    /// Failed-login lockout
    pub auth_rate_limiter: Arc<AuthRateLimiter>,
}

impl<S> AppState<S> {
    /// Create a new application state; fails if the settings are unusable
    pub fn new(storage: S, config: Settings) -> anyhow::Result<Self> {
        config.validate()?;

        let hasher = CredentialHasher::new(&config.auth.hashing)?;
        let tokens = TokenIssuer::new(&config.auth)?;
        let auth = Arc::new(DefaultAuth::new(hasher, tokens)?);

        Ok(Self::with_auth(storage, config, auth))
    }

    /// Assemble state around an existing auth service
    pub fn with_auth(storage: S, config: Settings, auth: Arc<dyn AuthService>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::from_settings(&config.rate_limit));
        let auth_rate_limiter = Arc::new(AuthRateLimiter::from_settings(&config.auth));

        Self {
            auth,
            storage,
            settings: Arc::new(config),
            rate_limiter,
            auth_rate_limiter,
        }
    }

    /// Create a new application state backed by flat files at the configured path
    pub fn new_default(config: Settings) -> anyhow::Result<Self>
    where
        S: From<FlatFileStorage>,
    {
        let storage = S::from(FlatFileStorage::new(&config.storage.path)?);
        Self::new(storage, config)
    }
}
