//! User profile service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::validate_phone;

const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "fr", "pt", "hi", "sw"];

#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub preferred_language: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub preferred_language: Option<String>,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, email, name, phone, region, preferred_language, created_at, last_login_at
            FROM users
            WHERE id = $1 AND is_active = true
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> AppResult<UserProfile> {
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Name cannot be empty".to_string(),
                });
            }
        }
        if let Some(phone) = &input.phone {
            validate_phone(phone).map_err(|e| AppError::Validation {
                field: "phone".to_string(),
                message: e.to_string(),
            })?;
        }
        if let Some(language) = &input.preferred_language {
            if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
                return Err(AppError::Validation {
                    field: "preferred_language".to_string(),
                    message: format!(
                        "Unsupported language. Supported: {}",
                        SUPPORTED_LANGUAGES.join(", ")
                    ),
                });
            }
        }

        let name = input.name.map(|n| n.trim().to_string());

        sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                region = COALESCE($4, region),
                preferred_language = COALESCE($5, preferred_language),
                updated_at = NOW()
            WHERE id = $1 AND is_active = true
            RETURNING id, email, name, phone, region, preferred_language, created_at, last_login_at
            "#,
        )
        .bind(user_id)
        .bind(&name)
        .bind(&input.phone)
        .bind(&input.region)
        .bind(&input.preferred_language)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}
