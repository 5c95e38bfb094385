//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::auth::{AuthResponse, AuthTokens, LoginInput, RegisterInput};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let result = auth_service.register(input).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let result = auth_service.login(input).await?;

    Ok(Json(result))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh(&body.refresh_token).await?;

    Ok(Json(tokens))
}
