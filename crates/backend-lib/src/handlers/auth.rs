//! Registration, login and logout.
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use visionassist_common::{LoginRequest, MessageResponse, RegisterRequest, TokenResponse};

use crate::auth::{AuthError, AuthUser, ClientIp};
use crate::error::AppError;
use crate::storage::{NewUser, Storage};
use crate::validation::{normalize_email, validate_name, validate_register};
use crate::{metrics, AppState};

/// `POST /api/auth/register`
pub async fn register<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    validate_register(&payload)?;
    let name = validate_name(&payload.name)?.to_string();
    let email = normalize_email(&payload.email);

    // Cheap pre-check so a taken address costs no hashing; create_user rechecks under lock
    if state.storage.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::EmailTaken);
    }

    let password_hash = state.auth.hash_password(payload.password).await?;
    let user = state
        .storage
        .create_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    let access_token = state.auth.issue_token(&user.id.to_string())?;

    metrics::record(metrics::USER_REGISTERED);
    tracing::info!(user_id = %user.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::bearer(access_token, user.to_response())),
    ))
}

/// `POST /api/auth/login`
pub async fn login<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientIp(ip): ClientIp,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if let Some(ip) = ip {
        if !state.auth_rate_limiter.check_rate_limit(ip) {
            return Err(AppError::AuthRateLimited);
        }
    }

    let email = normalize_email(&payload.email);
    let user = state.storage.find_user_by_email(&email).await?;
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let verified = state.auth.verify_password(payload.password, stored_hash).await;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            if let Some(ip) = ip {
                state.auth_rate_limiter.record_failed_attempt(ip);
            }
            metrics::record(metrics::LOGIN_FAILED);
            tracing::warn!(client = ?ip, "failed login");
            return Err(AuthError::InvalidCredentials.into());
        },
    };

    if let Some(ip) = ip {
        state.auth_rate_limiter.record_success(ip);
    }

    let access_token = state.auth.issue_token(&user.id.to_string())?;

    metrics::record(metrics::LOGIN_SUCCEEDED);
    tracing::info!(user_id = %user.id, "login");

    Ok(Json(TokenResponse::bearer(access_token, user.to_response())))
}

/// `POST /api/auth/logout`
///
/// Tokens are stateless, so this only confirms the caller held a valid one;
/// the client is expected to discard it.
pub async fn logout(AuthUser(user_id): AuthUser) -> Json<MessageResponse> {
    tracing::info!(%user_id, "logout");
    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}
