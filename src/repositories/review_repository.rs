//! Repositorio de Reviews

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::review::Review;
use crate::utils::errors::AppError;

pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_reviewee(&self, reviewee_id: Uuid) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE reviewee_id = $1 ORDER BY created_at DESC",
        )
        .bind(reviewee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Ya existe una review de este reviewer para esta reserva
    pub async fn exists(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE booking_id = $1 AND reviewer_id = $2)",
        )
        .bind(booking_id)
        .bind(reviewer_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(result.0)
    }

    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, AppError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, booking_id, reviewer_id, reviewee_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(rating)
        .bind(comment)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(review)
    }
}
