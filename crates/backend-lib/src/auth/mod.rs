// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.
mod error;
pub mod extractor;
pub mod password;
pub mod rate_limit;
mod service;
mod service_impl;
pub mod token;

pub use error::AuthError;
pub use extractor::{AuthUser, ClientIp};
pub use password::{
    validate_password_strength, CredentialHasher, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use rate_limit::AuthRateLimiter;
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::TokenIssuer;
