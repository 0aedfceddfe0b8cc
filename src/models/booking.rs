//! Modelo de Booking
//!
//! Este módulo contiene el struct Booking, la máquina de estados de la
//! reserva y la tabla de capacidades driver/passenger.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::ride::RideStatus;
use crate::utils::errors::{invalid_transition_error, AppError};

/// Ventana de review tras la finalización del ride
pub const REVIEW_WINDOW_HOURS: i64 = 24;

/// Estado de la reserva - mapea al ENUM booking_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Declined => "declined",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Parsear un estado recibido por la API
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "pending" => Ok(BookingStatus::Pending),
            "accepted" => Ok(BookingStatus::Accepted),
            "declined" => Ok(BookingStatus::Declined),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(AppError::BadRequest(format!(
                "Invalid booking status value: '{}'",
                other
            ))),
        }
    }

    /// Estados terminales: no admiten más transiciones
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Declined | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    /// Solo las reservas aceptadas ocupan plaza en el inventario
    pub fn occupies_seat(&self) -> bool {
        matches!(self, BookingStatus::Accepted)
    }
}

/// Estado del pago - mapea al ENUM payment_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Held,
    Released,
    Refunded,
}

/// Rol del actor que intenta mutar una reserva
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingActor {
    Driver,
    Passenger,
}

/// Tabla de capacidades de la reserva: qué actor puede llevarla de un
/// estado a otro. Es una función pura evaluada dentro de la misma
/// transacción que la escritura.
///
/// - driver: pending -> accepted | declined
/// - passenger: pending|accepted -> cancelled
/// - passenger: accepted -> completed (solo vía confirmación)
pub fn authorize_transition(
    actor: BookingActor,
    from: BookingStatus,
    to: BookingStatus,
) -> Result<(), AppError> {
    use BookingActor::*;
    use BookingStatus::*;

    // Quién tiene autoridad sobre cada estado destino
    let owner = match to {
        Accepted | Declined => Driver,
        Cancelled | Completed => Passenger,
        Pending => {
            return Err(AppError::BadRequest(
                "A booking cannot be moved back to 'pending'".to_string(),
            ))
        }
    };

    if actor != owner {
        let role = match owner {
            Driver => "driver",
            Passenger => "passenger",
        };
        return Err(AppError::Forbidden(format!(
            "Only the {} can set a booking to '{}'",
            role,
            to.as_str()
        )));
    }

    let valid_from = match to {
        Accepted | Declined => from == Pending,
        Cancelled => matches!(from, Pending | Accepted),
        Completed => from == Accepted,
        Pending => unreachable!(),
    };

    if !valid_from {
        return Err(invalid_transition_error(from.as_str(), to.as_str()));
    }

    Ok(())
}

/// Booking principal - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub passenger_id: Uuid,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub confirm_deadline: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Verificar si la ventana de confirmación del pasajero está abierta.
    ///
    /// Elegible cuando la reserva sigue aceptada y sin confirmar, el ride
    /// ya terminó (marcado por el conductor) o su hora de salida pasó, y
    /// no se superó el deadline de confirmación.
    pub fn confirmation_open(
        &self,
        ride_status: RideStatus,
        departure_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.confirmed_at.is_some() {
            return Err(AppError::InvalidTransition(
                "Booking has already been confirmed".to_string(),
            ));
        }

        if self.status != BookingStatus::Accepted {
            return Err(invalid_transition_error(self.status.as_str(), "completed"));
        }

        let ride_finished = ride_status == RideStatus::Completed || now >= departure_time;
        if !ride_finished {
            return Err(AppError::InvalidTransition(
                "Ride has not departed yet and the driver has not marked it complete".to_string(),
            ));
        }

        if let Some(deadline) = self.confirm_deadline {
            if now > deadline {
                return Err(AppError::InvalidTransition(
                    "Confirmation window has closed".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Tiempo restante de la ventana de review, en segundos, recortado a cero.
/// Es un dato presentacional derivado de `completed_at + 24h - now`.
pub fn review_time_remaining(completed_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let deadline = completed_at + Duration::hours(REVIEW_WINDOW_HOURS);
    (deadline - now).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            ride_id: Uuid::new_v4(),
            passenger_id: Uuid::new_v4(),
            status,
            payment_status: PaymentStatus::Held,
            payment_amount: Decimal::new(2000, 2),
            paid_at: Utc::now(),
            confirm_deadline: None,
            confirmed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(BookingStatus::parse("accepted").unwrap(), BookingStatus::Accepted);
        assert_eq!(BookingStatus::parse("declined").unwrap(), BookingStatus::Declined);
        assert!(BookingStatus::parse("approved").is_err());
        assert!(BookingStatus::parse("").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Accepted.is_terminal());
        assert!(BookingStatus::Declined.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
    }

    #[test]
    fn test_only_accepted_occupies_seat() {
        assert!(BookingStatus::Accepted.occupies_seat());
        assert!(!BookingStatus::Pending.occupies_seat());
        assert!(!BookingStatus::Completed.occupies_seat());
    }

    #[test]
    fn test_driver_can_accept_and_decline_pending() {
        use BookingActor::*;
        use BookingStatus::*;
        assert!(authorize_transition(Driver, Pending, Accepted).is_ok());
        assert!(authorize_transition(Driver, Pending, Declined).is_ok());
    }

    #[test]
    fn test_passenger_cannot_accept() {
        use BookingActor::*;
        use BookingStatus::*;
        match authorize_transition(Passenger, Pending, Accepted) {
            Err(AppError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_driver_cannot_cancel() {
        use BookingActor::*;
        use BookingStatus::*;
        match authorize_transition(Driver, Accepted, Cancelled) {
            Err(AppError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_passenger_can_cancel_pending_and_accepted() {
        use BookingActor::*;
        use BookingStatus::*;
        assert!(authorize_transition(Passenger, Pending, Cancelled).is_ok());
        assert!(authorize_transition(Passenger, Accepted, Cancelled).is_ok());
    }

    #[test]
    fn test_reprocessing_terminal_booking_is_invalid() {
        use BookingActor::*;
        use BookingStatus::*;
        // Re-aceptar una reserva ya procesada
        for from in [Accepted, Declined, Cancelled, Completed] {
            match authorize_transition(Driver, from, Accepted) {
                Err(AppError::InvalidTransition(_)) => {}
                other => panic!("expected InvalidTransition from {:?}, got {:?}", from, other.err()),
            }
        }
        // Doble cancelación
        match authorize_transition(Passenger, Cancelled, Cancelled) {
            Err(AppError::InvalidTransition(_)) => {}
            other => panic!("expected InvalidTransition, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_no_transition_back_to_pending() {
        use BookingActor::*;
        use BookingStatus::*;
        assert!(authorize_transition(Driver, Accepted, Pending).is_err());
        assert!(authorize_transition(Passenger, Accepted, Pending).is_err());
    }

    #[test]
    fn test_confirmation_requires_departure_or_completed_ride() {
        let now = Utc::now();
        let b = booking(BookingStatus::Accepted);

        // Antes de la salida, ride aún upcoming: cerrada
        let future_departure = now + Duration::hours(2);
        assert!(b
            .confirmation_open(RideStatus::Upcoming, future_departure, now)
            .is_err());

        // Tras la hora de salida: abierta
        let past_departure = now - Duration::hours(2);
        assert!(b
            .confirmation_open(RideStatus::Upcoming, past_departure, now)
            .is_ok());

        // Conductor marcó completado antes de la hora: abierta
        assert!(b
            .confirmation_open(RideStatus::Completed, future_departure, now)
            .is_ok());
    }

    #[test]
    fn test_confirmation_rejected_for_non_accepted() {
        let now = Utc::now();
        let departure = now - Duration::hours(1);
        for status in [
            BookingStatus::Pending,
            BookingStatus::Declined,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            let b = booking(status);
            assert!(b.confirmation_open(RideStatus::Completed, departure, now).is_err());
        }
    }

    #[test]
    fn test_confirmation_rejected_when_already_confirmed() {
        let now = Utc::now();
        let mut b = booking(BookingStatus::Accepted);
        b.confirmed_at = Some(now - Duration::minutes(5));
        assert!(b
            .confirmation_open(RideStatus::Completed, now - Duration::hours(1), now)
            .is_err());
    }

    #[test]
    fn test_confirmation_rejected_past_deadline() {
        let now = Utc::now();
        let mut b = booking(BookingStatus::Accepted);
        b.confirm_deadline = Some(now - Duration::minutes(1));
        assert!(b
            .confirmation_open(RideStatus::Completed, now - Duration::hours(30), now)
            .is_err());

        // Dentro del deadline sigue abierta
        b.confirm_deadline = Some(now + Duration::hours(1));
        assert!(b
            .confirmation_open(RideStatus::Completed, now - Duration::hours(2), now)
            .is_ok());
    }

    #[test]
    fn test_review_time_remaining_clamped() {
        let now = Utc::now();

        let just_completed = review_time_remaining(now, now);
        assert_eq!(just_completed, REVIEW_WINDOW_HOURS * 3600);

        let expired = review_time_remaining(now - Duration::hours(48), now);
        assert_eq!(expired, 0);

        let halfway = review_time_remaining(now - Duration::hours(12), now);
        assert_eq!(halfway, 12 * 3600);
    }
}
