//! Repositorio de Bookings
//!
//! Acceso a la tabla bookings. Las operaciones de la máquina de estados
//! toman la transacción del caller: la lectura de precondiciones y la
//! escritura de estado deben ocurrir en la misma unidad atómica.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus, PaymentStatus};
use crate::utils::errors::AppError;

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn list_for_ride(&self, ride_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE ride_id = $1 ORDER BY created_at ASC",
        )
        .bind(ride_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn list_for_passenger(&self, passenger_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE passenger_id = $1 ORDER BY created_at DESC",
        )
        .bind(passenger_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Crear la reserva en pending/held dentro de la transacción del caller
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
        passenger_id: Uuid,
        payment_amount: Decimal,
    ) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, ride_id, passenger_id, status, payment_status, payment_amount, paid_at, created_at)
            VALUES ($1, $2, $3, 'pending', 'held', $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ride_id)
        .bind(passenger_id)
        .bind(payment_amount)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(booking)
    }

    /// Leer la reserva dentro de la transacción del caller, sin lock.
    /// Sirve para resolver el ride antes de tomar los locks en orden.
    pub async fn find_by_id_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(booking)
    }

    /// Leer la reserva con lock de fila, dentro de la transacción del caller
    pub async fn find_by_id_locked(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(booking)
    }

    /// El pasajero ya tiene una reserva activa (pending/accepted) en el ride
    pub async fn has_active_booking(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
        passenger_id: Uuid,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE ride_id = $1 AND passenger_id = $2 AND status IN ('pending', 'accepted')
            )
            "#,
        )
        .bind(ride_id)
        .bind(passenger_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(result.0)
    }

    pub async fn update_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;

        Ok(booking)
    }

    pub async fn set_payment_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET payment_status = $2 WHERE id = $1")
            .bind(id)
            .bind(payment_status)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn set_confirm_deadline(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        deadline: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET confirm_deadline = $2 WHERE id = $1")
            .bind(id)
            .bind(deadline)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Re-anclar el deadline de confirmación de las reservas aceptadas
    /// cuando el conductor marca el ride como completado
    pub async fn reanchor_confirm_deadlines(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
        deadline: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE bookings SET confirm_deadline = $2 WHERE ride_id = $1 AND status = 'accepted'",
        )
        .bind(ride_id)
        .bind(deadline)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Confirmación del pasajero: completed + pago liberado + confirmed_at,
    /// en una sola escritura
    pub async fn confirm(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        confirmed_at: DateTime<Utc>,
    ) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'completed', payment_status = 'released', confirmed_at = $2
            WHERE id = $1 AND status = 'accepted' AND confirmed_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(confirmed_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(booking)
    }

    /// Cuántas reservas del ride siguen aceptadas (agregado que deriva el
    /// estado del ride)
    pub async fn count_accepted_for_ride(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
    ) -> Result<i64, AppError> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings WHERE ride_id = $1 AND status = 'accepted'",
        )
        .bind(ride_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(result.0)
    }

    /// Reservas no terminales del ride, con lock, para la cascada de
    /// cancelación
    pub async fn find_non_terminal_for_ride_locked(
        tx: &mut Transaction<'_, Postgres>,
        ride_id: Uuid,
    ) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE ride_id = $1 AND status IN ('pending', 'accepted') FOR UPDATE",
        )
        .bind(ride_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(bookings)
    }
}
