//! Image-analysis history of the authenticated user.
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use visionassist_common::{AnalysisResponse, NewAnalysis};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::storage::{AnalysisRecord, Storage};
use crate::validation::validate_analysis;
use crate::{metrics, AppState};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// `GET /api/history`
pub async fn list_history<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<AnalysisResponse>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let records = state.storage.list_history(user_id, limit).await?;
    Ok(Json(records.iter().map(AnalysisRecord::to_response).collect()))
}

/// `POST /api/history`
pub async fn create_history<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(entry): Json<NewAnalysis>,
) -> Result<(StatusCode, Json<AnalysisResponse>), AppError> {
    validate_analysis(&entry)?;

    let record = AnalysisRecord::new(user_id, entry);
    state.storage.append_history(&record).await?;

    metrics::record(metrics::HISTORY_RECORDED);
    Ok((StatusCode::CREATED, Json(record.to_response())))
}
