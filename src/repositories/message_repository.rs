//! Repositorio de Messages (chat de ride)

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::message::Message;
use crate::utils::errors::AppError;

pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insertar un mensaje; sender_id None = mensaje de sistema
    pub async fn insert(
        &self,
        ride_id: Uuid,
        sender_id: Option<Uuid>,
        content: &str,
    ) -> Result<Message, AppError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, ride_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ride_id)
        .bind(sender_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn list_for_ride(&self, ride_id: Uuid) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE ride_id = $1 ORDER BY created_at ASC",
        )
        .bind(ride_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
