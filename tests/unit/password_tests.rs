// =========================
// tests/unit/password_tests.rs
// =========================
//! Unit tests for credential hashing
use backend_lib::auth::{AuthError, AuthService, CredentialHasher, DefaultAuth, TokenIssuer};
use backend_lib::config::{AuthSettings, HashAlgorithm};

use crate::test_utils::{cheap_hashing, TEST_SECRET};

fn hasher(algorithm: HashAlgorithm) -> CredentialHasher {
    CredentialHasher::new(&cheap_hashing(algorithm)).unwrap()
}

#[test]
fn test_hash_is_salted() {
    let hasher = hasher(HashAlgorithm::Argon2id);
    let first = hasher.hash("same-password").unwrap();
    let second = hasher.hash("same-password").unwrap();

    assert_ne!(first, second);
    assert!(hasher.verify("same-password", &first));
    assert!(hasher.verify("same-password", &second));
}

#[test]
fn test_hash_does_not_contain_plaintext() {
    let hasher = hasher(HashAlgorithm::Argon2id);
    let hash = hasher.hash("plaintext-marker").unwrap();
    assert!(!hash.contains("plaintext-marker"));
}

#[test]
fn test_scrypt_round_trip() {
    let hasher = hasher(HashAlgorithm::Scrypt);
    assert_eq!(hasher.algorithm(), HashAlgorithm::Scrypt);

    let hash = hasher.hash("scrypt-password").unwrap();
    assert!(hash.starts_with("$scrypt$"));
    assert!(hasher.verify("scrypt-password", &hash));
    assert!(!hasher.verify("Scrypt-password", &hash));
}

#[test]
fn test_argon2_hash_verifies_under_scrypt_setting() {
    let argon = hasher(HashAlgorithm::Argon2id);
    let hash = argon.hash("moved-back").unwrap();

    let scrypt = hasher(HashAlgorithm::Scrypt);
    assert!(scrypt.verify("moved-back", &hash));
}

#[test]
fn test_unicode_password() {
    let hasher = hasher(HashAlgorithm::Argon2id);
    let hash = hasher.hash("pässwörd-日本語").unwrap();
    assert!(hasher.verify("pässwörd-日本語", &hash));
    assert!(!hasher.verify("password-日本語", &hash));
}

#[test]
fn test_invalid_parameters_rejected() {
    let mut settings = cheap_hashing(HashAlgorithm::Argon2id);
    settings.argon2_iterations = 0;
    assert!(matches!(
        CredentialHasher::new(&settings),
        Err(AuthError::Config(_))
    ));
}

fn service() -> DefaultAuth {
    let tokens = TokenIssuer::new(&AuthSettings {
        jwt_secret: Some(TEST_SECRET.to_string()),
        ..AuthSettings::default()
    })
    .unwrap();
    DefaultAuth::new(hasher(HashAlgorithm::Argon2id), tokens).unwrap()
}

#[tokio::test]
async fn test_service_hash_and_verify() {
    let auth = service();
    let hash = auth.hash_password("service-password".to_string()).await.unwrap();

    assert!(auth.verify_password("service-password".to_string(), Some(hash.clone())).await);
    assert!(!auth.verify_password("wrong-password".to_string(), Some(hash)).await);
}

#[tokio::test]
async fn test_service_unknown_account_never_verifies() {
    let auth = service();
    assert!(!auth.verify_password("anything-at-all".to_string(), None).await);
}

#[tokio::test]
async fn test_service_token_round_trip() {
    let auth = service();
    let token = auth.issue_token("user-42").unwrap();
    assert_eq!(auth.verify_token(&token).unwrap(), "user-42");
    assert_eq!(auth.verify_token("garbage"), Err(AuthError::MalformedToken));
}
