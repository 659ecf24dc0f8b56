// ================
// common/src/lib.rs
// ================
//! Request and response bodies shared between the `VisionAssist` API and its clients.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a user account
pub type UserId = Uuid;

/// Token type reported alongside every access token
pub const BEARER: &str = "bearer";

/// Body of `POST /api/auth/register`
#[derive(Serialize, Deserialize, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/auth/login`
#[derive(Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Passwords must never reach a log line through `{:?}`.
impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Public view of a user account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub speech_rate: f64,
    pub high_contrast: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update; absent fields are left untouched
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_contrast: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.speech_rate.is_none() && self.high_contrast.is_none()
    }
}

/// Returned by register and login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

impl TokenResponse {
    pub fn bearer(access_token: String, user: UserResponse) -> Self {
        Self {
            access_token,
            token_type: BEARER.to_string(),
            user,
        }
    }
}

/// Body of `POST /api/history`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewAnalysis {
    #[serde(default)]
    pub image_filename: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Free-form detector output, stored as-is
    #[serde(default)]
    pub objects_detected: Option<serde_json::Value>,
}

/// One stored image-analysis result
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub image_filename: Option<String>,
    pub caption: Option<String>,
    pub objects_detected: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Plain acknowledgement body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of `GET /api/health`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}
