//! User profile handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::user::{UpdateProfileInput, UserProfile, UserService};
use crate::AppState;

/// Get the current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let service = UserService::new(state.db);
    let profile = service.get_profile(current_user.0.user_id).await?;
    Ok(Json(profile))
}

/// Update the current user's profile
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Json<UserProfile>> {
    let service = UserService::new(state.db);
    let profile = service.update_profile(current_user.0.user_id, input).await?;
    Ok(Json(profile))
}
