//! HTTP handlers for alert endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::alert::{AlertRecord, AlertService, AlertStatistics};
use crate::AppState;

/// Query parameters for listing alerts
#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    pub farm_id: Option<Uuid>,
    pub unacknowledged_only: Option<bool>,
}

/// List alerts across the user's farms, newest first
pub async fn list_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListAlertsQuery>,
) -> AppResult<Json<Vec<AlertRecord>>> {
    let service = AlertService::new(state.db);
    let unacknowledged_only = query.unacknowledged_only.unwrap_or(false);

    let alerts = service
        .get_alerts(current_user.0.user_id, query.farm_id, unacknowledged_only)
        .await?;
    Ok(Json(alerts))
}

/// Get alert statistics for the user's farms
pub async fn get_alert_statistics(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<AlertStatistics>> {
    let service = AlertService::new(state.db);
    let stats = service.statistics(current_user.0.user_id).await?;
    Ok(Json(stats))
}

/// Acknowledge an alert
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<AlertRecord>> {
    let service = AlertService::new(state.db);
    let alert = service.acknowledge(current_user.0.user_id, alert_id).await?;
    Ok(Json(alert))
}
