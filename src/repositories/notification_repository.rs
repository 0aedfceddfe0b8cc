//! Repositorio de Notifications

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::notification::Notification;
use crate::utils::errors::AppError;

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        recipient_id: Uuid,
        kind: &str,
        title: &str,
        body: &str,
        ride_id: Option<Uuid>,
        booking_id: Option<Uuid>,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, recipient_id, kind, title, body, ride_id, booking_id, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipient_id)
        .bind(kind)
        .bind(title)
        .bind(body)
        .bind(ride_id)
        .bind(booking_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn list_for_recipient(&self, recipient_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 ORDER BY created_at DESC LIMIT 100",
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }
}
