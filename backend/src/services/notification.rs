//! Notification service
//!
//! Delivers alert notifications over SMS when the owner has a phone
//! number and the gateway accepts the message. Every delivery problem
//! downgrades to the in-app feed so an alert is never lost.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::NotificationChannel;
use shared::models::StressLevel;
use shared::types::Urgency;

pub const CHANNEL_SMS: &str = "sms";
pub const CHANNEL_IN_APP: &str = "in_app";

#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
    channel: Arc<dyn NotificationChannel>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub urgency: String,
    pub channel: String,
    pub alert_id: Option<Uuid>,
    pub sms_message_id: Option<String>,
    pub error_message: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CreateNotificationInput {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub urgency: Urgency,
    pub channel: String,
    pub alert_id: Option<Uuid>,
    pub sms_message_id: Option<String>,
    pub error_message: Option<String>,
}

impl NotificationService {
    pub fn new(db: PgPool, channel: Arc<dyn NotificationChannel>) -> Self {
        Self { db, channel }
    }

    // ============================================================
    // Dispatch
    // ============================================================

    /// Deliver an alert to its owner. SMS is attempted when a phone
    /// number is on file; otherwise the notification goes straight to
    /// the in-app feed.
    pub async fn notify_alert(
        &self,
        user_id: Uuid,
        phone: Option<&str>,
        alert_id: Uuid,
        title: &str,
        message: &str,
        urgency: Urgency,
    ) -> AppResult<NotificationRecord> {
        let base = CreateNotificationInput {
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            urgency,
            channel: CHANNEL_IN_APP.to_string(),
            alert_id: Some(alert_id),
            sms_message_id: None,
            error_message: None,
        };

        let Some(phone) = phone else {
            return self.create_notification(base).await;
        };

        let text = format!("{}\n\n{}", title, message);
        match self.channel.send(phone, &text, urgency).await {
            Ok(receipt) if receipt.success => {
                self.create_notification(CreateNotificationInput {
                    channel: CHANNEL_SMS.to_string(),
                    sms_message_id: receipt.message_id,
                    ..base
                })
                .await
            }
            Ok(receipt) => {
                tracing::warn!(
                    "SMS gateway declined message for user {}: {}",
                    user_id,
                    receipt.error.as_deref().unwrap_or("no reason given")
                );
                self.create_notification(CreateNotificationInput {
                    error_message: receipt.error,
                    ..base
                })
                .await
            }
            Err(e) => {
                tracing::warn!("SMS delivery failed for user {}: {}", user_id, e);
                self.create_notification(CreateNotificationInput {
                    error_message: Some(e.to_string()),
                    ..base
                })
                .await
            }
        }
    }

    pub async fn create_notification(
        &self,
        input: CreateNotificationInput,
    ) -> AppResult<NotificationRecord> {
        let record = sqlx::query_as::<_, NotificationRecord>(
            r#"
            INSERT INTO notifications
                (user_id, title, message, urgency, channel, alert_id, sms_message_id, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, title, message, urgency, channel, alert_id,
                      sms_message_id, error_message, is_read, read_at, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.title)
        .bind(&input.message)
        .bind(input.urgency.as_str())
        .bind(&input.channel)
        .bind(input.alert_id)
        .bind(&input.sms_message_id)
        .bind(&input.error_message)
        .fetch_one(&self.db)
        .await?;

        Ok(record)
    }

    // ============================================================
    // In-App Feed
    // ============================================================

    pub async fn get_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> AppResult<Vec<NotificationRecord>> {
        let limit = limit.clamp(1, 100);

        let notifications = if unread_only {
            sqlx::query_as::<_, NotificationRecord>(
                r#"
                SELECT id, user_id, title, message, urgency, channel, alert_id,
                       sms_message_id, error_message, is_read, read_at, created_at
                FROM notifications
                WHERE user_id = $1 AND is_read = false
                ORDER BY created_at DESC
                LIMIT $2
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, NotificationRecord>(
                r#"
                SELECT id, user_id, title, message, urgency, channel, alert_id,
                       sms_message_id, error_message, is_read, read_at, created_at
                FROM notifications
                WHERE user_id = $1
                ORDER BY created_at DESC
                LIMIT $2
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.db)
            .await?
        };

        Ok(notifications)
    }

    pub async fn get_unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(count.unwrap_or(0))
    }

    pub async fn mark_as_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification".to_string()));
        }

        Ok(())
    }

    pub async fn mark_all_as_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = COALESCE(read_at, NOW())
            WHERE user_id = $1 AND is_read = false
            "#,
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}

// ============================================================
// Alert Message Builders
// ============================================================

pub fn build_alert_title(level: StressLevel, farm_name: &str) -> String {
    match level {
        StressLevel::Severe => format!("Severe crop stress on {}", farm_name),
        StressLevel::High => format!("High crop stress on {}", farm_name),
        _ => format!("Crop stress warning for {}", farm_name),
    }
}

pub fn build_alert_message(
    farm_name: &str,
    level: StressLevel,
    ndvi: f64,
    trend_slope: f64,
) -> String {
    let trend = if trend_slope <= -0.01 {
        "falling"
    } else if trend_slope >= 0.01 {
        "recovering"
    } else {
        "flat"
    };

    format!(
        "NDVI for {} is {:.2} ({} stress) with a {} trend. Review the recommended actions and inspect the field if conditions persist.",
        farm_name,
        ndvi,
        level.as_str(),
        trend
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_alert_title_by_severity() {
        assert_eq!(
            build_alert_title(StressLevel::Severe, "North Field"),
            "Severe crop stress on North Field"
        );
        assert_eq!(
            build_alert_title(StressLevel::High, "North Field"),
            "High crop stress on North Field"
        );
        assert_eq!(
            build_alert_title(StressLevel::Moderate, "North Field"),
            "Crop stress warning for North Field"
        );
    }

    #[test]
    fn test_build_alert_message_trend_wording() {
        let falling = build_alert_message("North Field", StressLevel::High, 0.28, -0.08);
        assert!(falling.contains("falling"));
        assert!(falling.contains("0.28"));

        let flat = build_alert_message("North Field", StressLevel::Moderate, 0.35, 0.0);
        assert!(flat.contains("flat"));

        let recovering = build_alert_message("North Field", StressLevel::Moderate, 0.38, 0.02);
        assert!(recovering.contains("recovering"));
    }
}
