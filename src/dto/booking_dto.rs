use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::booking::{review_time_remaining, Booking, BookingStatus, PaymentStatus};
use crate::models::review::Review;

// Request para crear una reserva
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub ride_id: Uuid,
    // El cliente confirma que el pago quedó retenido
    pub payment_confirmed: bool,
}

// Request para aceptar/rechazar/cancelar una reserva
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

// Request de confirmación del pasajero, con rating opcional al conductor
#[derive(Debug, Deserialize)]
pub struct ConfirmBookingRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

// Request del conductor para valorar al pasajero
#[derive(Debug, Deserialize)]
pub struct RatePassengerRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

// Response de reserva para la API
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub passenger_id: Uuid,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub confirm_deadline: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    // Tiempo restante (segundos) de la ventana de review; solo presentacional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_time_remaining_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl BookingResponse {
    /// Construir la response calculando el countdown de review si aplica
    pub fn from_booking(booking: Booking, now: DateTime<Utc>) -> Self {
        let review_time_remaining_secs = booking
            .confirmed_at
            .map(|confirmed| review_time_remaining(confirmed, now));

        Self {
            id: booking.id,
            ride_id: booking.ride_id,
            passenger_id: booking.passenger_id,
            status: booking.status,
            payment_status: booking.payment_status,
            payment_amount: booking.payment_amount,
            paid_at: booking.paid_at,
            confirm_deadline: booking.confirm_deadline,
            confirmed_at: booking.confirmed_at,
            review_time_remaining_secs,
            created_at: booking.created_at,
        }
    }
}

// Response de review
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            booking_id: review.booking_id,
            reviewer_id: review.reviewer_id,
            reviewee_id: review.reviewee_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

// Response de confirmación: booking actualizado + review creada (si hubo rating)
#[derive(Debug, Serialize)]
pub struct ConfirmBookingResponse {
    pub booking: BookingResponse,
    pub review: Option<ReviewResponse>,
}
