//! Controller de Rides
//!
//! Publicación y lectura de rides, marca de completado y cancelación con
//! cascada sobre las reservas no terminales.

use chrono::{Duration, Utc};
use futures::future::join_all;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::BookingResponse;
use crate::dto::ApiResponse;
use crate::dto::ride_dto::{
    CreateRideRequest, MessageResponse, ParticipantResponse, RideDetailResponse, RideFilters,
    RideResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::{BookingStatus, PaymentStatus, REVIEW_WINDOW_HOURS};
use crate::models::ride::RideStatus;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::message_repository::MessageRepository;
use crate::repositories::ride_repository::RideRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::notification_service::{kinds, NotificationService};
use crate::utils::errors::AppError;
use crate::utils::validation::{validate_future_departure, validate_positive};

pub struct RideController {
    pool: PgPool,
    repository: RideRepository,
    notifier: NotificationService,
}

impl RideController {
    pub fn new(pool: PgPool, notifier: NotificationService) -> Self {
        Self {
            repository: RideRepository::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Publicar un ride con el inventario completo disponible
    pub async fn create(
        &self,
        driver: &AuthenticatedUser,
        request: CreateRideRequest,
    ) -> Result<RideResponse, AppError> {
        request.validate().map_err(AppError::Validation)?;

        let now = Utc::now();
        validate_future_departure(request.departure_time, now).map_err(|_| {
            AppError::ValidationError("La hora de salida debe estar en el futuro".to_string())
        })?;
        validate_positive(request.price_per_seat).map_err(|_| {
            AppError::ValidationError("El precio por plaza debe ser positivo".to_string())
        })?;

        let ride = self
            .repository
            .create(
                driver.user_id,
                request.origin,
                request.destination,
                request.departure_time,
                request.price_per_seat,
                request.seats_total,
            )
            .await?;

        Ok(RideResponse::from(ride))
    }

    pub async fn list(&self, filters: RideFilters) -> Result<Vec<RideResponse>, AppError> {
        let rides = self.repository.list_upcoming(&filters).await?;
        Ok(rides.into_iter().map(RideResponse::from).collect())
    }

    /// Detalle del ride con conductor y pasajeros aceptados (participantes
    /// del chat)
    pub async fn get_detail(&self, ride_id: Uuid) -> Result<RideDetailResponse, AppError> {
        let ride = self
            .repository
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        let users = UserRepository::new(self.pool.clone());
        let driver = users
            .find_by_id(ride.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conductor no encontrado".to_string()))?;

        let passengers = users
            .find_accepted_passengers(ride.id)
            .await?
            .into_iter()
            .map(|u| ParticipantResponse {
                id: u.id,
                full_name: u.full_name,
            })
            .collect();

        Ok(RideDetailResponse {
            driver: ParticipantResponse {
                id: driver.id,
                full_name: driver.full_name,
            },
            passengers,
            ride: RideResponse::from(ride),
        })
    }

    /// Mensajes del chat del ride; solo para participantes
    pub async fn list_messages(
        &self,
        ride_id: Uuid,
        actor: &AuthenticatedUser,
    ) -> Result<Vec<MessageResponse>, AppError> {
        let ride = self
            .repository
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        if ride.driver_id != actor.user_id {
            let bookings = BookingRepository::new(self.pool.clone())
                .list_for_ride(ride_id)
                .await?;
            let is_participant = bookings
                .iter()
                .any(|b| b.passenger_id == actor.user_id && b.status == BookingStatus::Accepted);
            if !is_participant {
                return Err(AppError::Forbidden(
                    "No participas en este ride".to_string(),
                ));
            }
        }

        let messages = MessageRepository::new(self.pool.clone())
            .list_for_ride(ride_id)
            .await?;

        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }

    /// Reservas del ride, solo visibles para su conductor
    pub async fn list_bookings(
        &self,
        ride_id: Uuid,
        actor: &AuthenticatedUser,
    ) -> Result<Vec<BookingResponse>, AppError> {
        let ride = self
            .repository
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        if ride.driver_id != actor.user_id {
            return Err(AppError::Forbidden(
                "Solo el conductor puede ver las reservas del ride".to_string(),
            ));
        }

        let now = Utc::now();
        let bookings = BookingRepository::new(self.pool.clone())
            .list_for_ride(ride_id)
            .await?;

        Ok(bookings
            .into_iter()
            .map(|b| BookingResponse::from_booking(b, now))
            .collect())
    }

    /// El conductor marca el ride como completado, lo que abre la ventana
    /// de confirmación de los pasajeros aceptados
    pub async fn mark_completed(
        &self,
        ride_id: Uuid,
        driver: &AuthenticatedUser,
    ) -> Result<RideResponse, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let ride = RideRepository::find_by_id_locked(&mut tx, ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        if ride.driver_id != driver.user_id {
            return Err(AppError::Forbidden(
                "Solo el conductor puede completar el ride".to_string(),
            ));
        }

        if ride.status != RideStatus::Upcoming {
            return Err(AppError::InvalidTransition(format!(
                "El ride ya está en estado '{}'",
                ride.status.as_str()
            )));
        }

        let updated = RideRepository::mark_completed(&mut tx, ride_id, now).await?;

        // La ventana de confirmación se re-ancla a la hora real de cierre
        let deadline = now + Duration::hours(REVIEW_WINDOW_HOURS);
        BookingRepository::reanchor_confirm_deadlines(&mut tx, ride_id, deadline).await?;

        tx.commit().await?;

        self.notifier
            .system_message(ride_id, "El conductor marcó el viaje como completado")
            .await;

        let bookings = BookingRepository::new(self.pool.clone())
            .list_for_ride(ride_id)
            .await?;

        let body = format!(
            "El viaje {} → {} fue completado. Confirma para liberar el pago.",
            updated.origin, updated.destination
        );
        let notifications = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Accepted)
            .map(|b| {
                self.notifier.notify(
                    b.passenger_id,
                    kinds::RIDE_COMPLETED,
                    "Viaje completado",
                    &body,
                    Some(ride_id),
                    Some(b.id),
                )
            });
        join_all(notifications).await;

        Ok(RideResponse::from(updated))
    }

    /// Cancelación del ride por el conductor. Cascada atómica: las
    /// reservas pending quedan declined, las accepted quedan cancelled con
    /// pago reembolsado y plaza devuelta.
    pub async fn cancel(
        &self,
        ride_id: Uuid,
        driver: &AuthenticatedUser,
    ) -> Result<ApiResponse<RideResponse>, AppError> {
        let mut tx = self.pool.begin().await?;

        let ride = RideRepository::find_by_id_locked(&mut tx, ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        if ride.driver_id != driver.user_id {
            return Err(AppError::Forbidden(
                "Solo el conductor puede cancelar el ride".to_string(),
            ));
        }

        if ride.status != RideStatus::Upcoming {
            return Err(AppError::InvalidTransition(format!(
                "El ride ya está en estado '{}'",
                ride.status.as_str()
            )));
        }

        let affected =
            BookingRepository::find_non_terminal_for_ride_locked(&mut tx, ride_id).await?;

        for booking in &affected {
            match booking.status {
                BookingStatus::Pending => {
                    BookingRepository::update_status(&mut tx, booking.id, BookingStatus::Declined)
                        .await?;
                    BookingRepository::set_payment_status(
                        &mut tx,
                        booking.id,
                        PaymentStatus::Refunded,
                    )
                    .await?;
                }
                BookingStatus::Accepted => {
                    BookingRepository::update_status(&mut tx, booking.id, BookingStatus::Cancelled)
                        .await?;
                    BookingRepository::set_payment_status(
                        &mut tx,
                        booking.id,
                        PaymentStatus::Refunded,
                    )
                    .await?;
                    // Mantener la identidad de conservación de plazas
                    RideRepository::release_seat(&mut tx, ride_id).await?;
                }
                _ => {}
            }
        }

        RideRepository::set_status(&mut tx, ride_id, RideStatus::Cancelled).await?;

        tx.commit().await?;

        self.notifier
            .system_message(ride_id, "El conductor canceló el viaje")
            .await;

        let body = format!(
            "El viaje {} → {} fue cancelado. Tu pago será reembolsado.",
            ride.origin, ride.destination
        );
        let notifications = affected.iter().map(|b| {
            self.notifier.notify(
                b.passenger_id,
                kinds::RIDE_CANCELLED,
                "Viaje cancelado",
                &body,
                Some(ride_id),
                Some(b.id),
            )
        });
        join_all(notifications).await;

        let cancelled = self
            .repository
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| AppError::Internal("Ride desapareció tras la cancelación".to_string()))?;

        Ok(ApiResponse::success_with_message(
            RideResponse::from(cancelled),
            "Viaje cancelado; las reservas fueron reembolsadas".to_string(),
        ))
    }
}
