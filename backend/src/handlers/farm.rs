//! Farm management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::farm::{CreateFarmInput, FarmService, UpdateFarmInput};
use crate::AppState;

/// List all farms owned by the current user
pub async fn list_farms(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.get_farms(current_user.0.user_id).await {
        Ok(farms) => (StatusCode::OK, Json(serde_json::json!({ "farms": farms }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific farm
pub async fn get_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.get_farm(current_user.0.user_id, farm_id).await {
        Ok(farm) => (StatusCode::OK, Json(farm)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new farm
pub async fn create_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateFarmInput>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.create_farm(current_user.0.user_id, input).await {
        Ok(farm) => (StatusCode::CREATED, Json(farm)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a farm
pub async fn update_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<UpdateFarmInput>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.update_farm(current_user.0.user_id, farm_id, input).await {
        Ok(farm) => (StatusCode::OK, Json(farm)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Deactivate a farm
pub async fn delete_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = FarmService::new(state.db.clone());

    match service.delete_farm(current_user.0.user_id, farm_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
