// =========================
// tests/integration/history_flow_tests.rs
// =========================
//! Analysis history and health endpoints
use axum::http::StatusCode;
use serde_json::json;

use crate::test_utils::{get_request, json_request, TestApp};

#[tokio::test]
async fn test_history_newest_first() {
    let app = TestApp::new();
    let token = app.register("Sam", "sam@example.com", "password123").await;

    for i in 0..3 {
        let (status, body) = app
            .send(json_request(
                "POST",
                "/api/history",
                Some(&token),
                json!({
                    "image_filename": format!("photo-{i}.jpg"),
                    "caption": format!("caption {i}"),
                    "objects_detected": [{ "label": "cup", "confidence": 0.9 }],
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["caption"], format!("caption {i}"));
    }

    let (status, body) = app.send(get_request("/api/history", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["image_filename"], "photo-2.jpg");
    assert_eq!(entries[2]["image_filename"], "photo-0.jpg");
    assert_eq!(entries[0]["objects_detected"][0]["label"], "cup");
}

#[tokio::test]
async fn test_history_limit() {
    let app = TestApp::new();
    let token = app.register("Sam", "sam@example.com", "password123").await;

    for i in 0..4 {
        app.send(json_request(
            "POST",
            "/api/history",
            Some(&token),
            json!({ "caption": format!("caption {i}") }),
        ))
        .await;
    }

    let (status, body) = app.send(get_request("/api/history?limit=2", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["caption"], "caption 3");

    // Zero is clamped up to one
    let (_, body) = app.send(get_request("/api/history?limit=0", Some(&token))).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_history_is_per_user() {
    let app = TestApp::new();
    let sam = app.register("Sam", "sam@example.com", "password123").await;
    let kim = app.register("Kim", "kim@example.com", "password123").await;

    app.send(json_request(
        "POST",
        "/api/history",
        Some(&sam),
        json!({ "caption": "private" }),
    ))
    .await;

    let (status, body) = app.send(get_request("/api/history", Some(&kim))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_history_requires_token() {
    let app = TestApp::new();
    let (status, _) = app.send(get_request("/api/history", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(json_request("POST", "/api/history", None, json!({ "caption": "x" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_oversized_caption_rejected() {
    let app = TestApp::new();
    let token = app.register("Sam", "sam@example.com", "password123").await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/history",
            Some(&token),
            json!({ "caption": "c".repeat(10_001) }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.send(get_request("/api/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["version"], backend_lib::VERSION);
}
