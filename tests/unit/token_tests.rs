// =========================
// tests/unit/token_tests.rs
// =========================
//! Unit tests for access-token issuance and verification
use backend_lib::auth::{AuthError, TokenIssuer};
use backend_lib::config::AuthSettings;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

const SECRET: &str = "unit-test-secret-0123456789abcdef";

fn issuer() -> TokenIssuer {
    TokenIssuer::new(&AuthSettings {
        jwt_secret: Some(SECRET.to_string()),
        ..AuthSettings::default()
    })
    .unwrap()
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn forge(alg: Algorithm, claims: serde_json::Value) -> String {
    encode(
        &Header::new(alg),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_user_42_scenario() {
    let issuer = issuer();
    let token = issuer.issue("user-42", t0()).unwrap();

    assert_eq!(
        issuer.verify(&token, t0() + Duration::minutes(30)).unwrap(),
        "user-42"
    );
    assert_eq!(
        issuer.verify(&token, t0() + Duration::minutes(61)),
        Err(AuthError::ExpiredToken)
    );
}

#[test]
fn test_expired_one_second_after_ttl() {
    let issuer = issuer();
    let token = issuer.issue("user-42", t0()).unwrap();
    let late = t0() + issuer.ttl() + Duration::seconds(1);

    assert_eq!(issuer.verify(&token, late), Err(AuthError::ExpiredToken));
}

#[test]
fn test_custom_ttl() {
    let issuer = TokenIssuer::new(&AuthSettings {
        jwt_secret: Some(SECRET.to_string()),
        access_token_expire_minutes: 5,
        ..AuthSettings::default()
    })
    .unwrap();
    let token = issuer.issue("user-42", t0()).unwrap();

    assert!(issuer.verify(&token, t0() + Duration::minutes(4)).is_ok());
    assert_eq!(
        issuer.verify(&token, t0() + Duration::minutes(5)),
        Err(AuthError::ExpiredToken)
    );
}

#[test]
fn test_wire_format() {
    let token = issuer().issue("user-42", t0()).unwrap();
    let segments: Vec<&str> = token.split('.').collect();
    assert_eq!(segments.len(), 3);

    let header: serde_json::Value =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segments[0]).unwrap()).unwrap();
    assert_eq!(header["alg"], "HS256");

    let payload: serde_json::Value =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segments[1]).unwrap()).unwrap();
    assert_eq!(payload["sub"], "user-42");
    assert_eq!(
        payload["exp"].as_i64().unwrap(),
        (t0() + Duration::minutes(60)).timestamp()
    );
}

#[test]
fn test_altered_signature_is_malformed() {
    let issuer = issuer();
    let token = issuer.issue("user-42", t0()).unwrap();

    // Flip the first signature character
    let sig_start = token.rfind('.').unwrap() + 1;
    let mut bytes = token.into_bytes();
    bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    assert_eq!(
        issuer.verify(&tampered, t0()),
        Err(AuthError::MalformedToken)
    );
}

#[test]
fn test_altered_payload_is_malformed() {
    let issuer = issuer();
    let token = issuer.issue("user-42", t0()).unwrap();
    let segments: Vec<&str> = token.split('.').collect();

    let forged_payload = URL_SAFE_NO_PAD.encode(
        json!({ "sub": "admin", "exp": (t0() + Duration::days(365)).timestamp() }).to_string(),
    );
    let forged = format!("{}.{}.{}", segments[0], forged_payload, segments[2]);

    assert_eq!(issuer.verify(&forged, t0()), Err(AuthError::MalformedToken));
}

#[test]
fn test_garbage_is_malformed() {
    let issuer = issuer();
    for token in ["", "abc", "a.b", "a.b.c", "....", "not a token at all"] {
        assert_eq!(
            issuer.verify(token, t0()),
            Err(AuthError::MalformedToken),
            "{token:?} should be malformed"
        );
    }
}

#[test]
fn test_other_algorithm_rejected() {
    // Same secret, different HMAC: still refused
    let exp = (t0() + Duration::minutes(10)).timestamp();
    let token = forge(Algorithm::HS512, json!({ "sub": "user-42", "exp": exp }));

    assert_eq!(issuer().verify(&token, t0()), Err(AuthError::MalformedToken));
}

#[test]
fn test_unsigned_token_rejected() {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let exp = (t0() + Duration::minutes(10)).timestamp();
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "user-42", "exp": exp }).to_string());
    let token = format!("{header}.{payload}.");

    assert_eq!(issuer().verify(&token, t0()), Err(AuthError::MalformedToken));
}

#[test]
fn test_missing_or_empty_subject() {
    let exp = (t0() + Duration::minutes(10)).timestamp();

    let token = forge(Algorithm::HS256, json!({ "exp": exp }));
    assert_eq!(issuer().verify(&token, t0()), Err(AuthError::MissingSubject));

    let token = forge(Algorithm::HS256, json!({ "sub": "", "exp": exp }));
    assert_eq!(issuer().verify(&token, t0()), Err(AuthError::MissingSubject));
}

#[test]
fn test_missing_expiry_is_malformed() {
    let token = forge(Algorithm::HS256, json!({ "sub": "user-42" }));
    assert_eq!(issuer().verify(&token, t0()), Err(AuthError::MalformedToken));
}

#[test]
fn test_expiry_checked_before_subject() {
    let exp = t0().timestamp();
    let token = forge(Algorithm::HS256, json!({ "exp": exp }));
    assert_eq!(issuer().verify(&token, t0()), Err(AuthError::ExpiredToken));
}

#[test]
fn test_verify_is_shareable_across_threads() {
    let issuer = std::sync::Arc::new(issuer());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let issuer = issuer.clone();
            std::thread::spawn(move || {
                let id = format!("user-{i}");
                let token = issuer.issue(&id, t0()).unwrap();
                assert_eq!(issuer.verify(&token, t0()).unwrap(), id);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
