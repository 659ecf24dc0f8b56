//! Stateless bearer tokens.
//!
//! Tokens are HMAC-signed JWTs carrying `sub` (the account id) and `exp`
//! (Unix seconds). Nothing is stored server-side: a token stays valid until it
//! expires or the signing key is rotated.
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::{AuthSettings, MAX_TOKEN_TTL_MINUTES};

/// Claims written at issuance
#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    sub: &'a str,
    exp: i64,
    iat: i64,
}

/// Claims read back; `sub` is optional so its absence is reported precisely
#[derive(Debug, Deserialize)]
struct PresentedClaims {
    #[serde(default)]
    sub: Option<String>,
    exp: i64,
}

/// Issues and verifies access tokens with one fixed key and algorithm
pub struct TokenIssuer {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Result<Self, AuthError> {
        let secret = settings
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::Config("missing signing secret".to_string()))?;
        let algorithm = settings
            .algorithm()
            .map_err(|e| AuthError::Config(e.to_string()))?;
        let ttl = Some(settings.access_token_expire_minutes)
            .filter(|m| (1..=MAX_TOKEN_TTL_MINUTES).contains(m))
            .and_then(|m| i64::try_from(m).ok())
            .and_then(Duration::try_minutes)
            .ok_or_else(|| AuthError::Config("token lifetime out of range".to_string()))?;

        // Only the configured algorithm is accepted. Expiry is checked by hand
        // against the caller's clock, so the library check is disabled.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `identity` that expires `ttl` after `now`
    pub fn issue(&self, identity: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        if identity.is_empty() {
            return Err(AuthError::MissingSubject);
        }

        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Signing("expiry out of range".to_string()))?;
        let claims = IssuedClaims {
            sub: identity,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Check signature, algorithm and expiry, then return the subject
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let data = decode::<PresentedClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(kind = ?e.kind(), "token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                    _ => AuthError::MalformedToken,
                }
            })?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::ExpiredToken);
        }

        match claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => Err(AuthError::MissingSubject),
        }
    }
}
