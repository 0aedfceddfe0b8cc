use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::ride::{Ride, RideStatus};

// Request para publicar un ride
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRideRequest {
    #[validate(length(min = 2, max = 200))]
    pub origin: String,

    #[validate(length(min = 2, max = 200))]
    pub destination: String,

    pub departure_time: DateTime<Utc>,

    pub price_per_seat: Decimal,

    #[validate(range(min = 1, max = 8))]
    pub seats_total: i32,
}

/// Filtros para búsqueda de rides
#[derive(Debug, Deserialize)]
pub struct RideFilters {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// Response de ride para la API
#[derive(Debug, Serialize)]
pub struct RideResponse {
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

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        Self {
            id: ride.id,
            driver_id: ride.driver_id,
            origin: ride.origin,
            destination: ride.destination,
            departure_time: ride.departure_time,
            price_per_seat: ride.price_per_seat,
            seats_total: ride.seats_total,
            seats_available: ride.seats_available,
            status: ride.status,
            completed_at: ride.completed_at,
            created_at: ride.created_at,
        }
    }
}

/// Participante del ride (resolución de participantes del chat)
#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub full_name: String,
}

/// Detalle de ride: datos del viaje + conductor + pasajeros aceptados
#[derive(Debug, Serialize)]
pub struct RideDetailResponse {
    #[serde(flatten)]
    pub ride: RideResponse,
    pub driver: ParticipantResponse,
    pub passengers: Vec<ParticipantResponse>,
}

/// Mensaje del chat del ride
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::models::message::Message> for MessageResponse {
    fn from(m: crate::models::message::Message) -> Self {
        Self {
            id: m.id,
            ride_id: m.ride_id,
            sender_id: m.sender_id,
            content: m.content,
            created_at: m.created_at,
        }
    }
}
