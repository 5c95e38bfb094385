//! Training video service
//!
//! Searches agronomy training videos and tracks per-user watch
//! progress. Deployments without a search API key serve the built-in
//! catalog instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::video_search::{builtin_catalog, VideoResult, VideoSearchClient};

#[derive(Clone)]
pub struct VideoService {
    db: PgPool,
    client: Option<VideoSearchClient>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct VideoProgressRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub video_id: String,
    pub title: Option<String>,
    pub position_seconds: i32,
    pub duration_seconds: Option<i32>,
    pub completed: bool,
    pub last_watched_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressInput {
    pub title: Option<String>,
    pub position_seconds: i32,
    pub duration_seconds: Option<i32>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct VideoStatistics {
    pub total_videos: i64,
    pub completed_videos: i64,
    pub total_watch_seconds: i64,
    pub last_watched_at: Option<DateTime<Utc>>,
}

impl VideoService {
    pub fn new(db: PgPool, client: Option<VideoSearchClient>) -> Self {
        Self { db, client }
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<VideoResult>> {
        match &self.client {
            Some(client) => client.search(query).await,
            None => Ok(builtin_catalog(query)),
        }
    }

    pub async fn get_progress(&self, user_id: Uuid) -> AppResult<Vec<VideoProgressRecord>> {
        let records = sqlx::query_as::<_, VideoProgressRecord>(
            r#"
            SELECT id, user_id, video_id, title, position_seconds, duration_seconds,
                   completed, last_watched_at
            FROM video_progress
            WHERE user_id = $1
            ORDER BY last_watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    pub async fn update_progress(
        &self,
        user_id: Uuid,
        video_id: &str,
        input: UpdateProgressInput,
    ) -> AppResult<VideoProgressRecord> {
        if video_id.trim().is_empty() {
            return Err(AppError::Validation {
                field: "video_id".to_string(),
                message: "Video id cannot be empty".to_string(),
            });
        }
        if input.position_seconds < 0 {
            return Err(AppError::Validation {
                field: "position_seconds".to_string(),
                message: "Position cannot be negative".to_string(),
            });
        }
        if let Some(duration) = input.duration_seconds {
            if duration <= 0 {
                return Err(AppError::Validation {
                    field: "duration_seconds".to_string(),
                    message: "Duration must be positive".to_string(),
                });
            }
        }

        // Watching past the end of a known duration counts as completion.
        let completed = input.completed.unwrap_or(false)
            || input
                .duration_seconds
                .map(|d| input.position_seconds >= d)
                .unwrap_or(false);

        // Completion is sticky. Re-watching a finished video keeps it
        // marked as completed.
        let record = sqlx::query_as::<_, VideoProgressRecord>(
            r#"
            INSERT INTO video_progress
                (user_id, video_id, title, position_seconds, duration_seconds, completed, last_watched_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (user_id, video_id) DO UPDATE
            SET position_seconds = EXCLUDED.position_seconds,
                title = COALESCE(EXCLUDED.title, video_progress.title),
                duration_seconds = COALESCE(EXCLUDED.duration_seconds, video_progress.duration_seconds),
                completed = video_progress.completed OR EXCLUDED.completed,
                last_watched_at = NOW()
            RETURNING id, user_id, video_id, title, position_seconds, duration_seconds,
                      completed, last_watched_at
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .bind(&input.title)
        .bind(input.position_seconds)
        .bind(input.duration_seconds)
        .bind(completed)
        .fetch_one(&self.db)
        .await?;

        Ok(record)
    }

    pub async fn statistics(&self, user_id: Uuid) -> AppResult<VideoStatistics> {
        let (total_videos, completed_videos, total_watch_seconds, last_watched_at): (
            i64,
            i64,
            Option<i64>,
            Option<DateTime<Utc>>,
        ) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE completed),
                   SUM(position_seconds)::bigint,
                   MAX(last_watched_at)
            FROM video_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(VideoStatistics {
            total_videos,
            completed_videos,
            total_watch_seconds: total_watch_seconds.unwrap_or(0),
            last_watched_at,
        })
    }
}
