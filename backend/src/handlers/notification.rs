//! HTTP handlers for notification endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::notification::{NotificationRecord, NotificationService};
use crate::AppState;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
}

/// Get the user's notification feed
pub async fn get_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<Json<Vec<NotificationRecord>>> {
    let service = NotificationService::new(state.db, state.notifier);
    let unread_only = query.unread_only.unwrap_or(false);
    let limit = query.limit.unwrap_or(50);

    let notifications = service
        .get_notifications(current_user.0.user_id, unread_only, limit)
        .await?;
    Ok(Json(notifications))
}

/// Unread count response
#[derive(Debug, serde::Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Get the unread notification count
pub async fn get_unread_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.db, state.notifier);
    let count = service.get_unread_count(current_user.0.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark a notification as read
pub async fn mark_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = NotificationService::new(state.db, state.notifier);
    service
        .mark_as_read(current_user.0.user_id, notification_id)
        .await?;
    Ok(Json(()))
}

/// Mark all read response
#[derive(Debug, serde::Serialize)]
pub struct MarkAllReadResponse {
    pub marked_count: u64,
}

/// Mark every unread notification as read
pub async fn mark_all_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<MarkAllReadResponse>> {
    let service = NotificationService::new(state.db, state.notifier);
    let count = service.mark_all_as_read(current_user.0.user_id).await?;
    Ok(Json(MarkAllReadResponse { marked_count: count }))
}
