//! HTTP handlers for stress analysis and forecasting endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::analysis::{
    AnalysisOutcome, AnalysisService, BulkAnalysisSummary, FarmForecast, StressReading,
};
use crate::services::NotificationService;
use crate::AppState;

const DEFAULT_FORECAST_DAYS: u32 = 7;

fn analysis_service(state: AppState) -> AnalysisService {
    let notifications = NotificationService::new(state.db.clone(), state.notifier);
    AnalysisService::new(
        state.db,
        state.analyzer,
        notifications,
        state.config.analysis.bulk_delay_ms,
    )
}

/// Get the current stress classification for a farm
pub async fn get_stress(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<StressReading>> {
    let service = analysis_service(state);
    let reading = service.get_stress(current_user.0.user_id, farm_id).await?;
    Ok(Json(reading))
}

/// Query parameters for the NDVI forecast
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<u32>,
}

/// Project NDVI for a farm over the coming days
pub async fn get_forecast(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<FarmForecast>> {
    let service = analysis_service(state);
    let days = query.days.unwrap_or(DEFAULT_FORECAST_DAYS);

    let mut rng = StdRng::from_entropy();
    let forecast = service
        .forecast_farm(current_user.0.user_id, farm_id, days, &mut rng)
        .await?;
    Ok(Json(forecast))
}

/// Run the full analysis pipeline for one farm
pub async fn analyze_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<AnalysisOutcome>> {
    let service = analysis_service(state);
    let outcome = service.analyze_farm(current_user.0.user_id, farm_id).await?;
    Ok(Json(outcome))
}

/// Analyze every active farm the user owns
pub async fn run_bulk_analysis(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<BulkAnalysisSummary>> {
    let service = analysis_service(state);
    let summary = service.run_bulk_analysis(current_user.0.user_id).await?;
    Ok(Json(summary))
}
