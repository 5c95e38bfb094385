//! Crop stress analysis orchestration
//!
//! Runs the full pipeline for a farm: load the NDVI history, obtain a
//! stress verdict, apply the alert guard and cooldown, persist the
//! alert, and hand it off to notification dispatch.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::{StressAnalysis, StressAnalyzer, StressContext};
use crate::services::alert::AlertRecord;
use crate::services::notification::{build_alert_message, build_alert_title, NotificationService};
use shared::models::{
    classify_value, cooldown_allows, trend_slope, AnalysisState, NdviSample, StressAssessment,
    StressLevel, SuppressReason, TrendForecast, MIN_FORECAST_SAMPLES, TREND_WINDOW,
};
use shared::validation::validate_forecast_horizon;

#[derive(Clone)]
pub struct AnalysisService {
    db: PgPool,
    analyzer: Arc<dyn StressAnalyzer>,
    notifications: NotificationService,
    bulk_delay_ms: u64,
}

/// Current stress snapshot for a farm, computed without touching the
/// alert pipeline.
#[derive(Debug, Serialize)]
pub struct StressReading {
    pub farm_id: Uuid,
    pub level: StressLevel,
    pub confidence: f64,
    pub trend_slope: f64,
    pub latest_ndvi: f64,
    pub latest_date: NaiveDate,
    pub samples_used: usize,
}

#[derive(Debug, Serialize)]
pub struct FarmForecast {
    pub farm_id: Uuid,
    #[serde(flatten)]
    pub forecast: TrendForecast,
}

#[derive(Debug, Serialize)]
pub struct AnalysisOutcome {
    pub farm_id: Uuid,
    pub state: AnalysisState,
    pub level: StressLevel,
    pub confidence: f64,
    pub trend_slope: f64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_reason: Option<SuppressReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertRecord>,
}

impl AnalysisOutcome {
    fn suppressed(
        farm_id: Uuid,
        analysis: StressAnalysis,
        trend_slope: f64,
        reason: SuppressReason,
    ) -> Self {
        Self {
            farm_id,
            state: AnalysisState::Suppressed,
            level: analysis.level,
            confidence: analysis.confidence,
            trend_slope,
            method: analysis.method,
            suppress_reason: Some(reason),
            alert: None,
        }
    }

    fn alerted(farm_id: Uuid, analysis: StressAnalysis, trend_slope: f64, alert: AlertRecord) -> Self {
        Self {
            farm_id,
            state: AnalysisState::Alerted,
            level: analysis.level,
            confidence: analysis.confidence,
            trend_slope,
            method: analysis.method,
            suppress_reason: None,
            alert: Some(alert),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkAnalysisSummary {
    pub total: usize,
    pub alerted: usize,
    pub suppressed: usize,
    pub failed: usize,
    pub by_level: StressLevelCounts,
    pub failures: Vec<BulkFailure>,
}

/// Per-level tally over the analyses that completed
#[derive(Debug, Default, Serialize)]
pub struct StressLevelCounts {
    pub healthy: usize,
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub severe: usize,
}

impl StressLevelCounts {
    fn record(&mut self, level: StressLevel) {
        match level {
            StressLevel::Healthy => self.healthy += 1,
            StressLevel::Low => self.low += 1,
            StressLevel::Moderate => self.moderate += 1,
            StressLevel::High => self.high += 1,
            StressLevel::Severe => self.severe += 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkFailure {
    pub farm_id: Uuid,
    pub error: String,
}

#[derive(Debug, sqlx::FromRow)]
struct FarmContext {
    name: String,
    crop_type: String,
    owner_id: Uuid,
    owner_phone: Option<String>,
}

impl AnalysisService {
    pub fn new(
        db: PgPool,
        analyzer: Arc<dyn StressAnalyzer>,
        notifications: NotificationService,
        bulk_delay_ms: u64,
    ) -> Self {
        Self {
            db,
            analyzer,
            notifications,
            bulk_delay_ms,
        }
    }

    /// Classify the farm's current stress from stored readings only.
    pub async fn get_stress(&self, owner_id: Uuid, farm_id: Uuid) -> AppResult<StressReading> {
        self.load_farm(owner_id, farm_id).await?;

        let samples = self.recent_samples(farm_id).await?;
        let latest = samples.first().ok_or_else(|| {
            AppError::InsufficientData("No NDVI readings recorded for this farm".to_string())
        })?;

        let slope = trend_slope(&samples);
        let assessment = classify_value(latest.ndvi, slope);

        Ok(StressReading {
            farm_id,
            level: assessment.level,
            confidence: assessment.confidence,
            trend_slope: slope,
            latest_ndvi: latest.ndvi,
            latest_date: latest.date,
            samples_used: samples.len(),
        })
    }

    /// Project NDVI over the requested horizon.
    pub async fn forecast_farm<R: Rng + Send>(
        &self,
        owner_id: Uuid,
        farm_id: Uuid,
        horizon_days: u32,
        rng: &mut R,
    ) -> AppResult<FarmForecast> {
        validate_forecast_horizon(horizon_days).map_err(|e| AppError::Validation {
            field: "days".to_string(),
            message: e.to_string(),
        })?;

        self.load_farm(owner_id, farm_id).await?;

        let samples = self.recent_samples(farm_id).await?;
        let prediction = shared::models::forecast(&samples, horizon_days, rng);

        Ok(FarmForecast {
            farm_id,
            forecast: prediction,
        })
    }

    /// Analyze one farm end to end. Returns the outcome rather than an
    /// error when the assessment is suppressed; errors are reserved for
    /// missing farms, thin histories, and infrastructure failures.
    pub async fn analyze_farm(&self, owner_id: Uuid, farm_id: Uuid) -> AppResult<AnalysisOutcome> {
        let farm = self.load_farm(owner_id, farm_id).await?;

        let samples = self.recent_samples(farm_id).await?;
        if samples.len() < MIN_FORECAST_SAMPLES {
            return Err(AppError::InsufficientData(format!(
                "Need at least {} NDVI readings to analyze, found {}",
                MIN_FORECAST_SAMPLES,
                samples.len()
            )));
        }

        let slope = trend_slope(&samples);
        let latest_ndvi = samples[0].ndvi;

        let context = StressContext {
            crop_type: farm.crop_type.clone(),
            latest_ndvi,
            trend_slope: slope,
            recent: samples,
        };

        let analysis = match self.analyzer.analyze(&context).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(
                    "Stress analyzer unavailable for farm {}, falling back to rule-based: {}",
                    farm_id,
                    e
                );
                crate::external::RuleBasedAnalyzer.analyze(&context).await?
            }
        };

        let assessment = StressAssessment {
            level: analysis.level,
            confidence: analysis.confidence,
        };
        if !assessment.warrants_alert() {
            let reason = if assessment.level <= StressLevel::Low {
                SuppressReason::BelowThreshold
            } else {
                SuppressReason::LowConfidence
            };
            tracing::debug!(
                "Suppressed {} assessment for farm {} ({})",
                analysis.level,
                farm_id,
                reason.as_str()
            );
            return Ok(AnalysisOutcome::suppressed(farm_id, analysis, slope, reason));
        }

        let rank = assessment.level.severity_rank();
        let last: Option<(DateTime<Utc>, i16)> = sqlx::query_as(
            "SELECT last_alerted_at, severity_rank FROM alert_cooldowns WHERE farm_id = $1",
        )
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?;

        if !cooldown_allows(Utc::now(), last, rank) {
            tracing::debug!("Cooldown active for farm {}, suppressing alert", farm_id);
            return Ok(AnalysisOutcome::suppressed(
                farm_id,
                analysis,
                slope,
                SuppressReason::CooldownActive,
            ));
        }

        let mut tx = self.db.begin().await?;

        // The conditional upsert only lands when the window has lapsed or
        // the severity escalated. Zero rows means a concurrent analysis
        // claimed the window first.
        let claimed = sqlx::query(
            r#"
            INSERT INTO alert_cooldowns (farm_id, last_alerted_at, severity_rank)
            VALUES ($1, NOW(), $2)
            ON CONFLICT (farm_id) DO UPDATE
            SET last_alerted_at = NOW(), severity_rank = EXCLUDED.severity_rank, updated_at = NOW()
            WHERE alert_cooldowns.last_alerted_at < NOW() - INTERVAL '24 hours'
               OR EXCLUDED.severity_rank > alert_cooldowns.severity_rank
            "#,
        )
        .bind(farm_id)
        .bind(rank)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            return Ok(AnalysisOutcome::suppressed(
                farm_id,
                analysis,
                slope,
                SuppressReason::CooldownActive,
            ));
        }

        let message = build_alert_message(&farm.name, analysis.level, latest_ndvi, slope);
        let recommendations = serde_json::to_value(&analysis.recommendations)
            .map_err(|e| AppError::Internal(format!("Failed to encode recommendations: {}", e)))?;

        let alert = sqlx::query_as::<_, AlertRecord>(
            r#"
            INSERT INTO alerts
                (farm_id, stress_level, confidence, ndvi, trend_slope, method, recommendations, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, farm_id, stress_level, confidence, ndvi, trend_slope, method,
                      recommendations, message, acknowledged, acknowledged_at, created_at
            "#,
        )
        .bind(farm_id)
        .bind(analysis.level.as_str())
        .bind(analysis.confidence)
        .bind(latest_ndvi)
        .bind(slope)
        .bind(&analysis.method)
        .bind(&recommendations)
        .bind(&message)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Alert {} raised for farm {} at {} stress",
            alert.id,
            farm_id,
            analysis.level
        );

        // Dispatch happens after commit. A notification failure is logged
        // and the alert stands.
        let title = build_alert_title(analysis.level, &farm.name);
        if let Err(e) = self
            .notifications
            .notify_alert(
                farm.owner_id,
                farm.owner_phone.as_deref(),
                alert.id,
                &title,
                &alert.message,
                analysis.level.urgency(),
            )
            .await
        {
            tracing::error!("Failed to record notification for alert {}: {}", alert.id, e);
        }

        Ok(AnalysisOutcome::alerted(farm_id, analysis, slope, alert))
    }

    /// Analyze every active farm the user owns, sequentially. One farm
    /// failing does not stop the rest.
    pub async fn run_bulk_analysis(&self, owner_id: Uuid) -> AppResult<BulkAnalysisSummary> {
        let farm_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM farms WHERE owner_id = $1 AND is_active = true ORDER BY name ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        let mut summary = BulkAnalysisSummary {
            total: farm_ids.len(),
            alerted: 0,
            suppressed: 0,
            failed: 0,
            by_level: StressLevelCounts::default(),
            failures: Vec::new(),
        };

        for (i, farm_id) in farm_ids.into_iter().enumerate() {
            // Pace the runs so a large portfolio does not hammer the analyzer.
            if i > 0 {
                tokio::time::sleep(Duration::from_millis(self.bulk_delay_ms)).await;
            }

            match self.analyze_farm(owner_id, farm_id).await {
                Ok(outcome) => {
                    summary.by_level.record(outcome.level);
                    match outcome.state {
                        AnalysisState::Alerted => summary.alerted += 1,
                        AnalysisState::Suppressed => summary.suppressed += 1,
                    }
                }
                Err(e) => {
                    tracing::error!("Bulk analysis failed for farm {}: {}", farm_id, e);
                    summary.failed += 1;
                    summary.failures.push(BulkFailure {
                        farm_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Bulk analysis for user {}: {} farms, {} alerted, {} suppressed, {} failed",
            owner_id,
            summary.total,
            summary.alerted,
            summary.suppressed,
            summary.failed
        );

        Ok(summary)
    }

    async fn load_farm(&self, owner_id: Uuid, farm_id: Uuid) -> AppResult<FarmContext> {
        sqlx::query_as::<_, FarmContext>(
            r#"
            SELECT f.name, f.crop_type, f.owner_id, u.phone AS owner_phone
            FROM farms f
            JOIN users u ON u.id = f.owner_id
            WHERE f.id = $1 AND f.owner_id = $2 AND f.is_active = true
            "#,
        )
        .bind(farm_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))
    }

    /// Most recent readings, newest first, capped at the trend window.
    async fn recent_samples(&self, farm_id: Uuid) -> AppResult<Vec<NdviSample>> {
        let rows: Vec<(NaiveDate, f64, f64)> = sqlx::query_as(
            "SELECT date, ndvi, cloud_cover FROM ndvi_data WHERE farm_id = $1 ORDER BY date DESC LIMIT $2",
        )
        .bind(farm_id)
        .bind(TREND_WINDOW as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, ndvi, cloud_cover)| NdviSample {
                date,
                ndvi,
                cloud_cover,
            })
            .collect())
    }
}
