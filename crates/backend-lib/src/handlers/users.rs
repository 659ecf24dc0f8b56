//! Profile of the authenticated user.
use std::sync::Arc;

use axum::{extract::State, Json};
use visionassist_common::{UserResponse, UserUpdate};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::storage::Storage;
use crate::validation::validate_user_update;
use crate::AppState;

/// `GET /api/users/profile`
pub async fn get_profile<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .storage
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user.to_response()))
}

/// `PUT /api/users/profile`
pub async fn update_profile<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(update): Json<UserUpdate>,
) -> Result<Json<UserResponse>, AppError> {
    validate_user_update(&update)?;

    let user = state
        .storage
        .update_user(user_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::debug!(%user_id, "profile updated");
    Ok(Json(user.to_response()))
}
