//! HTTP handlers for NDVI data endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::ndvi::{AddSampleInput, NdviRecord, NdviService, SyncResult};
use crate::AppState;

/// Query parameters for NDVI history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Get NDVI history for a farm, newest first
pub async fn get_ndvi_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<NdviRecord>>> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(AppError::Validation {
                field: "start_date".to_string(),
                message: "Start date must not be after end date".to_string(),
            });
        }
    }

    let service = NdviService::new(state.db, state.imagery);
    let history = service
        .get_history(current_user.0.user_id, farm_id, query.start_date, query.end_date)
        .await?;
    Ok(Json(history))
}

/// Record a manual NDVI reading
pub async fn add_ndvi_sample(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<AddSampleInput>,
) -> Result<(StatusCode, Json<NdviRecord>), AppError> {
    let service = NdviService::new(state.db, state.imagery);
    let record = service
        .add_sample(current_user.0.user_id, farm_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Pull the latest observation from the imagery provider
pub async fn sync_ndvi(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<SyncResult>> {
    let service = NdviService::new(state.db, state.imagery);
    let result = service
        .sync_from_satellite(current_user.0.user_id, farm_id)
        .await?;
    Ok(Json(result))
}
