// =============
// crates/backend-lib/src/auth/service.rs
// =============
//! This module defines the `AuthService` trait, the seam between request
//! handlers and the credential/token core.
use async_trait::async_trait;

use super::AuthError;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Hash a plaintext password; the buffer is wiped afterwards
    async fn hash_password(&self, plain: String) -> Result<String, AuthError>;

    /// Check a login attempt. `stored_hash` is `None` for unknown accounts,
    /// which still cost a full verification and always fail.
    async fn verify_password(&self, plain: String, stored_hash: Option<String>) -> bool;

    /// Issue an access token for an account id
    fn issue_token(&self, identity: &str) -> Result<String, AuthError>;

    /// Verify an access token and return the account id it names
    fn verify_token(&self, token: &str) -> Result<String, AuthError>;
}
