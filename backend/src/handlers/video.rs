//! HTTP handlers for training video endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::external::VideoResult;
use crate::middleware::CurrentUser;
use crate::services::video::{
    UpdateProgressInput, VideoProgressRecord, VideoService, VideoStatistics,
};
use crate::AppState;

/// Query parameters for video search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Search agronomy training videos
pub async fn search_videos(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<VideoResult>>> {
    if query.q.trim().is_empty() {
        return Err(AppError::Validation {
            field: "q".to_string(),
            message: "Search query cannot be empty".to_string(),
        });
    }

    let service = VideoService::new(state.db, state.video);
    let results = service.search(query.q.trim()).await?;
    Ok(Json(results))
}

/// List the user's video watch progress
pub async fn get_video_progress(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<VideoProgressRecord>>> {
    let service = VideoService::new(state.db, state.video);
    let progress = service.get_progress(current_user.0.user_id).await?;
    Ok(Json(progress))
}

/// Record watch progress for a video
pub async fn update_video_progress(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(video_id): Path<String>,
    Json(input): Json<UpdateProgressInput>,
) -> AppResult<Json<VideoProgressRecord>> {
    let service = VideoService::new(state.db, state.video);
    let record = service
        .update_progress(current_user.0.user_id, &video_id, input)
        .await?;
    Ok(Json(record))
}

/// Get the user's watch statistics
pub async fn get_video_statistics(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<VideoStatistics>> {
    let service = VideoService::new(state.db, state.video);
    let stats = service.statistics(current_user.0.user_id).await?;
    Ok(Json(stats))
}
