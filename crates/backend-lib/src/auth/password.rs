// ============================
// visionassist-backend/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! Hashes are PHC strings (`$argon2id$...` or `$scrypt$...`) carrying their own
//! algorithm, parameters and salt, so verification needs nothing but the string.
use argon2::{Algorithm, Argon2, Params as Argon2Params, Version};
use scrypt::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use scrypt::{Params as ScryptParams, Scrypt};
use zeroize::Zeroize;

use super::AuthError;
use crate::config::{HashAlgorithm, HashingSettings};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length; bounds the work an attacker can request
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// One-way credential hasher with a tunable work factor
#[derive(Clone)]
pub struct CredentialHasher {
    algorithm: HashAlgorithm,
    argon2: Argon2<'static>,
    scrypt: ScryptParams,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    pub fn new(settings: &HashingSettings) -> Result<Self, AuthError> {
        let argon2_params = Argon2Params::new(
            settings.argon2_memory_kib,
            settings.argon2_iterations,
            settings.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("argon2 parameters: {e}")))?;

        let scrypt = ScryptParams::new(
            settings.scrypt_log_n,
            settings.scrypt_r,
            settings.scrypt_p,
            ScryptParams::RECOMMENDED_LEN,
        )
        .map_err(|e| AuthError::Config(format!("scrypt parameters: {e}")))?;

        Ok(Self {
            algorithm: settings.algorithm,
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params),
            scrypt,
        })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> Result<String, AuthError> {
        if plain.is_empty() {
            return Err(AuthError::Hashing("empty password".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = match self.algorithm {
            HashAlgorithm::Argon2id => self.argon2.hash_password(plain.as_bytes(), &salt),
            HashAlgorithm::Scrypt => {
                Scrypt.hash_password_customized(plain.as_bytes(), None, None, self.scrypt, &salt)
            },
        }
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Both supported KDFs are tried so hashes written before an algorithm
    /// switch keep working. Malformed hashes simply fail.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        let verifiers: [&dyn PasswordVerifier; 2] = [&self.argon2, &Scrypt];
        parsed_hash.verify_password(&verifiers, plain).is_ok()
    }

    /// Hash a password and wipe the plaintext buffer
    pub fn hash_secure(&self, plain: &mut String) -> Result<String, AuthError> {
        let hash = self.hash(plain);
        plain.zeroize();
        hash
    }
}

/// Check the registration length bounds
pub fn validate_password_strength(password: &str) -> bool {
    let len = password.chars().count();
    (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len)
}
