//! Modelo de Ride
//!
//! Este módulo contiene el struct Ride y su máquina de estados.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del ride - mapea al ENUM ride_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "ride_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Upcoming => "upcoming",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }

    /// Una vez completado o cancelado, el ride no admite nuevas reservas
    /// ni transiciones de sus reservas terminales
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }
}

/// Ride principal - mapea exactamente a la tabla rides
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ride {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub price_per_seat: Decimal,
    pub seats_total: i32,
    pub seats_available: i32,
    pub status: RideStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Ride {
    /// Verificar si el ride puede recibir nuevas reservas
    pub fn accepts_bookings(&self, now: DateTime<Utc>) -> bool {
        self.status == RideStatus::Upcoming && self.departure_time > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ride(status: RideStatus, departure: DateTime<Utc>) -> Ride {
        Ride {
            id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            origin: "Lyon".to_string(),
            destination: "Paris".to_string(),
            departure_time: departure,
            price_per_seat: Decimal::new(2000, 2),
            seats_total: 3,
            seats_available: 3,
            status,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!RideStatus::Upcoming.is_terminal());
        assert!(RideStatus::Completed.is_terminal());
        assert!(RideStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_accepts_bookings() {
        let now = Utc::now();
        assert!(ride(RideStatus::Upcoming, now + Duration::hours(1)).accepts_bookings(now));
        assert!(!ride(RideStatus::Upcoming, now - Duration::hours(1)).accepts_bookings(now));
        assert!(!ride(RideStatus::Completed, now + Duration::hours(1)).accepts_bookings(now));
        assert!(!ride(RideStatus::Cancelled, now + Duration::hours(1)).accepts_bookings(now));
    }
}
