use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use zeroize::Zeroize;

use crate::auth::{AuthError, AuthService, CredentialHasher, TokenIssuer};

/// Production auth service: hashing on the blocking pool, tokens against the wall clock
pub struct DefaultAuth {
    hasher: Arc<CredentialHasher>,
    tokens: Arc<TokenIssuer>,
    dummy_hash: Arc<str>,
}

impl DefaultAuth {
    pub fn new(hasher: CredentialHasher, tokens: TokenIssuer) -> Result<Self, AuthError> {
        // Verified against when the email is unknown so timing matches a real account
        let dummy_hash = hasher.hash("visionassist-dummy-credential")?;
        Ok(Self {
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
            dummy_hash: dummy_hash.into(),
        })
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn hash_password(&self, mut plain: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash_secure(&mut plain))
            .await
            .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, mut plain: String, stored_hash: Option<String>) -> bool {
        let hasher = self.hasher.clone();
        let known = stored_hash.is_some();
        let hash = stored_hash.unwrap_or_else(|| self.dummy_hash.to_string());

        let matched = tokio::task::spawn_blocking(move || {
            let ok = hasher.verify(&plain, &hash);
            plain.zeroize();
            ok
        })
        .await
        .unwrap_or_else(|e| {
            tracing::error!("password verification task failed: {e}");
            false
        });

        known && matched
    }

    fn issue_token(&self, identity: &str) -> Result<String, AuthError> {
        self.tokens.issue(identity, Utc::now())
    }

    fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        self.tokens.verify(token, Utc::now())
    }
}
