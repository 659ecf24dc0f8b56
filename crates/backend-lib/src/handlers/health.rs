use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use visionassist_common::HealthResponse;

use crate::storage::Storage;
use crate::{AppState, VERSION};

/// `GET /api/health`
pub async fn health<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.storage.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                database: "connected".to_string(),
                version: VERSION.to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    database: "disconnected".to_string(),
                    version: VERSION.to_string(),
                }),
            )
        },
    }
}
