//! NDVI data service
//!
//! Stores vegetation index readings per farm and pulls fresh
//! observations from the configured imagery provider.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ImageryProvider;
use shared::models::NdviSample;
use shared::validation::{is_low_cloud, validate_cloud_cover, validate_ndvi_value};

pub const SOURCE_MANUAL: &str = "manual";

#[derive(Clone)]
pub struct NdviService {
    db: PgPool,
    imagery: Arc<dyn ImageryProvider>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct NdviRecord {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub date: NaiveDate,
    pub ndvi: f64,
    pub cloud_cover: f64,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl NdviRecord {
    pub fn as_sample(&self) -> NdviSample {
        NdviSample {
            date: self.date,
            ndvi: self.ndvi,
            cloud_cover: self.cloud_cover,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddSampleInput {
    pub date: NaiveDate,
    pub ndvi: f64,
    pub cloud_cover: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub created: bool,
    pub sample: NdviRecord,
}

#[derive(Debug, sqlx::FromRow)]
struct FarmLocation {
    latitude: Decimal,
    longitude: Decimal,
}

impl NdviService {
    pub fn new(db: PgPool, imagery: Arc<dyn ImageryProvider>) -> Self {
        Self { db, imagery }
    }

    pub async fn get_history(
        &self,
        owner_id: Uuid,
        farm_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Vec<NdviRecord>> {
        self.ensure_owned(owner_id, farm_id).await?;

        let records = sqlx::query_as::<_, NdviRecord>(
            r#"
            SELECT id, farm_id, date, ndvi, cloud_cover, source, created_at
            FROM ndvi_data
            WHERE farm_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            ORDER BY date DESC
            "#,
        )
        .bind(farm_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    /// Record a manually observed reading, e.g. from a handheld sensor
    /// or a drone pass.
    pub async fn add_sample(
        &self,
        owner_id: Uuid,
        farm_id: Uuid,
        input: AddSampleInput,
    ) -> AppResult<NdviRecord> {
        self.ensure_owned(owner_id, farm_id).await?;

        validate_ndvi_value(input.ndvi).map_err(|e| AppError::Validation {
            field: "ndvi".to_string(),
            message: e.to_string(),
        })?;
        let cloud_cover = input.cloud_cover.unwrap_or(0.0);
        validate_cloud_cover(cloud_cover).map_err(|e| AppError::Validation {
            field: "cloud_cover".to_string(),
            message: e.to_string(),
        })?;

        let duplicate: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ndvi_data WHERE farm_id = $1 AND date = $2",
        )
        .bind(farm_id)
        .bind(input.date)
        .fetch_optional(&self.db)
        .await?;

        if duplicate.unwrap_or(0) > 0 {
            return Err(AppError::Conflict(
                "A reading for this date already exists".to_string(),
            ));
        }

        let record = sqlx::query_as::<_, NdviRecord>(
            r#"
            INSERT INTO ndvi_data (farm_id, date, ndvi, cloud_cover, source)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, farm_id, date, ndvi, cloud_cover, source, created_at
            "#,
        )
        .bind(farm_id)
        .bind(input.date)
        .bind(input.ndvi)
        .bind(cloud_cover)
        .bind(SOURCE_MANUAL)
        .fetch_one(&self.db)
        .await?;

        Ok(record)
    }

    /// Fetch the latest observation from the imagery provider. Re-syncing
    /// a date that already has a reading is a no-op rather than an error
    /// so that scheduled syncs stay idempotent.
    pub async fn sync_from_satellite(&self, owner_id: Uuid, farm_id: Uuid) -> AppResult<SyncResult> {
        let location = sqlx::query_as::<_, FarmLocation>(
            "SELECT latitude, longitude FROM farms WHERE id = $1 AND owner_id = $2 AND is_active = true",
        )
        .bind(farm_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))?;

        let observation = self
            .imagery
            .fetch_latest(location.latitude, location.longitude)
            .await?;

        validate_ndvi_value(observation.ndvi)
            .map_err(|e| AppError::ExternalService(format!("Imagery returned bad NDVI: {}", e)))?;
        validate_cloud_cover(observation.cloud_cover).map_err(|e| {
            AppError::ExternalService(format!("Imagery returned bad cloud cover: {}", e))
        })?;

        if !is_low_cloud(observation.cloud_cover) {
            tracing::warn!(
                "Observation for farm {} has {:.0}% cloud cover, NDVI may be unreliable",
                farm_id,
                observation.cloud_cover
            );
        }

        let existing = sqlx::query_as::<_, NdviRecord>(
            r#"
            SELECT id, farm_id, date, ndvi, cloud_cover, source, created_at
            FROM ndvi_data
            WHERE farm_id = $1 AND date = $2
            "#,
        )
        .bind(farm_id)
        .bind(observation.date)
        .fetch_optional(&self.db)
        .await?;

        if let Some(sample) = existing {
            tracing::debug!(
                "Farm {} already has a reading for {}, skipping",
                farm_id,
                observation.date
            );
            return Ok(SyncResult {
                created: false,
                sample,
            });
        }

        let sample = sqlx::query_as::<_, NdviRecord>(
            r#"
            INSERT INTO ndvi_data (farm_id, date, ndvi, cloud_cover, source)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, farm_id, date, ndvi, cloud_cover, source, created_at
            "#,
        )
        .bind(farm_id)
        .bind(observation.date)
        .bind(observation.ndvi)
        .bind(observation.cloud_cover)
        .bind(&observation.source)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Synced NDVI {:.3} ({}) for farm {}",
            sample.ndvi,
            sample.date,
            farm_id
        );

        Ok(SyncResult {
            created: true,
            sample,
        })
    }

    async fn ensure_owned(&self, owner_id: Uuid, farm_id: Uuid) -> AppResult<()> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM farms WHERE id = $1 AND owner_id = $2 AND is_active = true",
        )
        .bind(farm_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        if count.unwrap_or(0) == 0 {
            return Err(AppError::NotFound("Farm".to_string()));
        }

        Ok(())
    }
}
