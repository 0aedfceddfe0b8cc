//! Repositorio de Rides
//!
//! Acceso a la tabla rides, incluido el ledger de inventario de plazas.
//! Los decrementos/incrementos de plazas son UPDATEs condicionales: la
//! guardia autoritativa vive en SQL, nunca en una pre-lectura cacheada.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::ride_dto::RideFilters;
use crate::models::ride::{Ride, RideStatus};
use crate::utils::errors::AppError;

pub struct RideRepository {
    pool: PgPool,
}

impl RideRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        driver_id: Uuid,
        origin: String,
        destination: String,
        departure_time: DateTime<Utc>,
        price_per_seat: Decimal,
        seats_total: i32,
    ) -> Result<Ride, AppError> {
        let ride = sqlx::query_as::<_, Ride>(
            r#"
            INSERT INTO rides (id, driver_id, origin, destination, departure_time, price_per_seat, seats_total, seats_available, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, 'upcoming', $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(driver_id)
        .bind(origin)
        .bind(destination)
        .bind(departure_time)
        .bind(price_per_seat)
        .bind(seats_total)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(ride)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Ride>, AppError> {
        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ride)
    }

    pub async fn list_upcoming(&self, filters: &RideFilters) -> Result<Vec<Ride>, AppError> {
        let limit = filters.limit.unwrap_or(50).min(100);
        let offset = filters.offset.unwrap_or(0);

        let rides = sqlx::query_as::<_, Ride>(
            r#"
            SELECT * FROM rides
            WHERE status = 'upcoming'
            AND departure_time > NOW()
            AND ($1::text IS NULL OR origin ILIKE '%' || $1 || '%')
            AND ($2::text IS NULL OR destination ILIKE '%' || $2 || '%')
            AND ($3::date IS NULL OR departure_time::date = $3)
            ORDER BY departure_time ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&filters.origin)
        .bind(&filters.destination)
        .bind(filters.date)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rides)
    }

    pub async fn list_by_driver(&self, driver_id: Uuid) -> Result<Vec<Ride>, AppError> {
        let rides = sqlx::query_as::<_, Ride>(
            "SELECT * FROM rides WHERE driver_id = $1 ORDER BY departure_time DESC",
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rides)
    }

    /// Leer el ride con lock de fila, dentro de la transacción del caller
    pub async fn find_by_id_locked(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Ride>, AppError> {
        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(ride)
    }

    /// Reservar una plaza: decremento condicional. Devuelve false si el
    /// inventario quedó agotado (la carrera se perdió).
    pub async fn reserve_seat(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE rides SET seats_available = seats_available - 1 WHERE id = $1 AND seats_available > 0",
        )
        .bind(ride_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Devolver una plaza al inventario: incremento condicional acotado
    /// por seats_total.
    pub async fn release_seat(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE rides SET seats_available = seats_available + 1 WHERE id = $1 AND seats_available < seats_total",
        )
        .bind(ride_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
        status: RideStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE rides SET status = $2 WHERE id = $1")
            .bind(ride_id)
            .bind(status)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn mark_completed(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<Ride, AppError> {
        let ride = sqlx::query_as::<_, Ride>(
            "UPDATE rides SET status = 'completed', completed_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(ride_id)
        .bind(completed_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(ride)
    }
}
