//! Authentication service
//!
//! Handles registration, login, and JWT token management for farmers
//! and agronomists using the platform.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::validation::{validate_email, validate_password, validate_phone};

#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub preferred_language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

#[derive(Debug, Serialize)]
struct Claims {
    sub: String,
    email: String,
    exp: i64,
    iat: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    is_active: bool,
}

impl AuthService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new account and issue the first token pair.
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthResponse> {
        validate_email(&input.email).map_err(|e| AppError::Validation {
            field: "email".to_string(),
            message: e.to_string(),
        })?;
        validate_password(&input.password).map_err(|e| AppError::Validation {
            field: "password".to_string(),
            message: e.to_string(),
        })?;
        if let Some(phone) = &input.phone {
            validate_phone(phone).map_err(|e| AppError::Validation {
                field: "phone".to_string(),
                message: e.to_string(),
            })?;
        }
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name cannot be empty".to_string(),
            });
        }

        let email = input.email.trim().to_lowercase();

        let existing: Option<i64> = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.db)
            .await?;

        if existing.unwrap_or(0) > 0 {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        let language = input.preferred_language.unwrap_or_else(|| "en".to_string());

        let user_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash, name, phone, region, preferred_language)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.region)
        .bind(&language)
        .fetch_one(&self.db)
        .await?;

        let tokens = self.generate_tokens(user_id, &email)?;
        self.store_refresh_token(user_id, &tokens.refresh_token).await?;

        tracing::info!("Registered new user {} ({})", user_id, email);

        Ok(AuthResponse {
            user_id,
            name: input.name.trim().to_string(),
            email,
            tokens,
        })
    }

    /// Verify credentials and issue a fresh token pair.
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        let email = input.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, name, is_active FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = bcrypt::verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let tokens = self.generate_tokens(user.id, &user.email)?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        Ok(AuthResponse {
            user_id: user.id,
            name: user.name,
            email: user.email,
            tokens,
        })
    }

    /// Exchange a refresh token for a new token pair, revoking the old one.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);

        let row: Option<(Uuid, Uuid, String)> = sqlx::query_as(
            r#"
            SELECT rt.id, u.id, u.email
            FROM refresh_tokens rt
            JOIN users u ON u.id = rt.user_id
            WHERE rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND u.is_active = true
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?;

        let (token_id, user_id, email) = row.ok_or_else(|| {
            AppError::Unauthorized("Invalid or expired refresh token".to_string())
        })?;

        sqlx::query("UPDATE refresh_tokens SET revoked_at = NOW() WHERE id = $1")
            .bind(token_id)
            .execute(&self.db)
            .await?;

        let tokens = self.generate_tokens(user_id, &email)?;
        self.store_refresh_token(user_id, &tokens.refresh_token).await?;

        Ok(tokens)
    }

    fn generate_tokens(&self, user_id: Uuid, email: &str) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;

        let refresh_token = Uuid::new_v4().to_string();

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    async fn store_refresh_token(&self, user_id: Uuid, refresh_token: &str) -> AppResult<()> {
        let token_hash = hash_token(refresh_token);
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

/// Hash a refresh token before storage so a database leak does not
/// expose usable tokens.
fn hash_token(token: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
