//! Alert query and acknowledgement service
//!
//! Alerts are created by the analysis pipeline; this service covers the
//! read side and the acknowledgement workflow.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AlertRecord {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub stress_level: String,
    pub confidence: f64,
    pub ndvi: f64,
    pub trend_slope: f64,
    pub method: String,
    pub recommendations: serde_json::Value,
    pub message: String,
    pub acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AlertStatistics {
    pub total: i64,
    pub unacknowledged: i64,
    pub by_level: AlertLevelCounts,
    pub last_alert_at: Option<DateTime<Utc>>,
}

/// Alerts only exist at moderate severity and above; the guard filters
/// out healthy and low assessments before anything is persisted.
#[derive(Debug, Default, Serialize)]
pub struct AlertLevelCounts {
    pub moderate: i64,
    pub high: i64,
    pub severe: i64,
}

impl AlertService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_alerts(
        &self,
        owner_id: Uuid,
        farm_id: Option<Uuid>,
        unacknowledged_only: bool,
    ) -> AppResult<Vec<AlertRecord>> {
        let alerts = sqlx::query_as::<_, AlertRecord>(
            r#"
            SELECT a.id, a.farm_id, a.stress_level, a.confidence, a.ndvi, a.trend_slope,
                   a.method, a.recommendations, a.message, a.acknowledged, a.acknowledged_at,
                   a.created_at
            FROM alerts a
            JOIN farms f ON f.id = a.farm_id
            WHERE f.owner_id = $1
              AND ($2::uuid IS NULL OR a.farm_id = $2)
              AND (NOT $3 OR a.acknowledged = false)
            ORDER BY a.created_at DESC
            LIMIT 100
            "#,
        )
        .bind(owner_id)
        .bind(farm_id)
        .bind(unacknowledged_only)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    pub async fn acknowledge(&self, owner_id: Uuid, alert_id: Uuid) -> AppResult<AlertRecord> {
        let current: Option<(bool,)> = sqlx::query_as(
            r#"
            SELECT a.acknowledged
            FROM alerts a
            JOIN farms f ON f.id = a.farm_id
            WHERE a.id = $1 AND f.owner_id = $2
            "#,
        )
        .bind(alert_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        let (acknowledged,) = current.ok_or_else(|| AppError::NotFound("Alert".to_string()))?;

        if acknowledged {
            return Err(AppError::Conflict(
                "Alert is already acknowledged".to_string(),
            ));
        }

        let alert = sqlx::query_as::<_, AlertRecord>(
            r#"
            UPDATE alerts
            SET acknowledged = true, acknowledged_at = NOW()
            WHERE id = $1
            RETURNING id, farm_id, stress_level, confidence, ndvi, trend_slope, method,
                      recommendations, message, acknowledged, acknowledged_at, created_at
            "#,
        )
        .bind(alert_id)
        .fetch_one(&self.db)
        .await?;

        Ok(alert)
    }

    pub async fn statistics(&self, owner_id: Uuid) -> AppResult<AlertStatistics> {
        let (total, unacknowledged, last_alert_at): (i64, i64, Option<DateTime<Utc>>) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*), COUNT(*) FILTER (WHERE NOT a.acknowledged), MAX(a.created_at)
                FROM alerts a
                JOIN farms f ON f.id = a.farm_id
                WHERE f.owner_id = $1
                "#,
            )
            .bind(owner_id)
            .fetch_one(&self.db)
            .await?;

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT a.stress_level, COUNT(*)
            FROM alerts a
            JOIN farms f ON f.id = a.farm_id
            WHERE f.owner_id = $1
            GROUP BY a.stress_level
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        let mut by_level = AlertLevelCounts::default();
        for (level, count) in rows {
            match level.as_str() {
                "moderate" => by_level.moderate = count,
                "high" => by_level.high = count,
                "severe" => by_level.severe = count,
                _ => {}
            }
        }

        Ok(AlertStatistics {
            total,
            unacknowledged,
            by_level,
            last_alert_at,
        })
    }
}
