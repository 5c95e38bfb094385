//! Farm management service
//!
//! CRUD operations for monitored fields. Every query is scoped to the
//! owning user so one account can never see another account's farms.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{
    validate_area_hectares, validate_crop_type, validate_farm_name, validate_latitude,
    validate_longitude,
};

#[derive(Clone)]
pub struct FarmService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Farm {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub crop_type: String,
    pub area_hectares: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFarmInput {
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub crop_type: String,
    pub area_hectares: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFarmInput {
    pub name: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub crop_type: Option<String>,
    pub area_hectares: Option<Decimal>,
}

impl FarmService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_farm(&self, owner_id: Uuid, input: CreateFarmInput) -> AppResult<Farm> {
        validate_farm_name(&input.name).map_err(|e| AppError::Validation {
            field: "name".to_string(),
            message: e.to_string(),
        })?;
        validate_latitude(input.latitude).map_err(|e| AppError::Validation {
            field: "latitude".to_string(),
            message: e.to_string(),
        })?;
        validate_longitude(input.longitude).map_err(|e| AppError::Validation {
            field: "longitude".to_string(),
            message: e.to_string(),
        })?;
        validate_crop_type(&input.crop_type).map_err(|e| AppError::Validation {
            field: "crop_type".to_string(),
            message: e.to_string(),
        })?;
        validate_area_hectares(input.area_hectares).map_err(|e| AppError::Validation {
            field: "area_hectares".to_string(),
            message: e.to_string(),
        })?;

        let duplicate: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM farms WHERE owner_id = $1 AND LOWER(name) = LOWER($2) AND is_active = true",
        )
        .bind(owner_id)
        .bind(input.name.trim())
        .fetch_optional(&self.db)
        .await?;

        if duplicate.unwrap_or(0) > 0 {
            return Err(AppError::Conflict(
                "A farm with this name already exists".to_string(),
            ));
        }

        let farm = sqlx::query_as::<_, Farm>(
            r#"
            INSERT INTO farms (owner_id, name, latitude, longitude, crop_type, area_hectares)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, name, latitude, longitude, crop_type, area_hectares,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(input.name.trim())
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(&input.crop_type)
        .bind(input.area_hectares)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created farm {} for user {}", farm.id, owner_id);

        Ok(farm)
    }

    pub async fn get_farms(&self, owner_id: Uuid) -> AppResult<Vec<Farm>> {
        let farms = sqlx::query_as::<_, Farm>(
            r#"
            SELECT id, owner_id, name, latitude, longitude, crop_type, area_hectares,
                   is_active, created_at, updated_at
            FROM farms
            WHERE owner_id = $1 AND is_active = true
            ORDER BY name ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(farms)
    }

    pub async fn get_farm(&self, owner_id: Uuid, farm_id: Uuid) -> AppResult<Farm> {
        sqlx::query_as::<_, Farm>(
            r#"
            SELECT id, owner_id, name, latitude, longitude, crop_type, area_hectares,
                   is_active, created_at, updated_at
            FROM farms
            WHERE id = $1 AND owner_id = $2 AND is_active = true
            "#,
        )
        .bind(farm_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farm".to_string()))
    }

    pub async fn update_farm(
        &self,
        owner_id: Uuid,
        farm_id: Uuid,
        input: UpdateFarmInput,
    ) -> AppResult<Farm> {
        let existing = self.get_farm(owner_id, farm_id).await?;

        if let Some(name) = &input.name {
            validate_farm_name(name).map_err(|e| AppError::Validation {
                field: "name".to_string(),
                message: e.to_string(),
            })?;

            let duplicate: Option<i64> = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM farms
                WHERE owner_id = $1 AND LOWER(name) = LOWER($2) AND id != $3 AND is_active = true
                "#,
            )
            .bind(owner_id)
            .bind(name.trim())
            .bind(farm_id)
            .fetch_optional(&self.db)
            .await?;

            if duplicate.unwrap_or(0) > 0 {
                return Err(AppError::Conflict(
                    "A farm with this name already exists".to_string(),
                ));
            }
        }
        if let Some(latitude) = input.latitude {
            validate_latitude(latitude).map_err(|e| AppError::Validation {
                field: "latitude".to_string(),
                message: e.to_string(),
            })?;
        }
        if let Some(longitude) = input.longitude {
            validate_longitude(longitude).map_err(|e| AppError::Validation {
                field: "longitude".to_string(),
                message: e.to_string(),
            })?;
        }
        if let Some(crop_type) = &input.crop_type {
            validate_crop_type(crop_type).map_err(|e| AppError::Validation {
                field: "crop_type".to_string(),
                message: e.to_string(),
            })?;
        }
        if let Some(area) = input.area_hectares {
            validate_area_hectares(area).map_err(|e| AppError::Validation {
                field: "area_hectares".to_string(),
                message: e.to_string(),
            })?;
        }

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let latitude = input.latitude.unwrap_or(existing.latitude);
        let longitude = input.longitude.unwrap_or(existing.longitude);
        let crop_type = input.crop_type.unwrap_or(existing.crop_type);
        let area_hectares = input.area_hectares.unwrap_or(existing.area_hectares);

        let farm = sqlx::query_as::<_, Farm>(
            r#"
            UPDATE farms
            SET name = $3, latitude = $4, longitude = $5, crop_type = $6,
                area_hectares = $7, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, latitude, longitude, crop_type, area_hectares,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(farm_id)
        .bind(owner_id)
        .bind(&name)
        .bind(latitude)
        .bind(longitude)
        .bind(&crop_type)
        .bind(area_hectares)
        .fetch_one(&self.db)
        .await?;

        Ok(farm)
    }

    /// Deactivate a farm. History and alerts are preserved for reporting.
    pub async fn delete_farm(&self, owner_id: Uuid, farm_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE farms
            SET is_active = false, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND is_active = true
            "#,
        )
        .bind(farm_id)
        .bind(owner_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Farm".to_string()));
        }

        tracing::info!("Deactivated farm {}", farm_id);

        Ok(())
    }
}
