//! Controller de Bookings
//!
//! Motor del ciclo de vida de la reserva. Cada mutación se ejecuta como
//! una única transacción: las precondiciones se releen con lock dentro de
//! ella (nunca de una query anterior) y los side effects se despachan
//! después del commit.
//!
//! Orden de locks: siempre ride antes que booking, para no interbloquear
//! con la cascada de cancelación de rides.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::booking_dto::{
    BookingResponse, ConfirmBookingRequest, ConfirmBookingResponse, CreateBookingRequest,
    RatePassengerRequest, ReviewResponse, UpdateBookingStatusRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::{
    authorize_transition, Booking, BookingActor, BookingStatus, PaymentStatus, REVIEW_WINDOW_HOURS,
};
use crate::models::ride::{Ride, RideStatus};
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::review_repository::ReviewRepository;
use crate::repositories::ride_repository::RideRepository;
use crate::services::notification_service::{kinds, NotificationService};
use crate::utils::errors::AppError;
use crate::utils::validation::{validate_comment, validate_rating};

pub struct BookingController {
    pool: PgPool,
    repository: BookingRepository,
    notifier: NotificationService,
}

impl BookingController {
    pub fn new(pool: PgPool, notifier: NotificationService) -> Self {
        Self {
            repository: BookingRepository::new(pool.clone()),
            pool,
            notifier,
        }
    }

    /// Crear una reserva (pending/held) sobre un ride abierto
    pub async fn create(
        &self,
        passenger: &AuthenticatedUser,
        request: CreateBookingRequest,
    ) -> Result<BookingResponse, AppError> {
        if !request.payment_confirmed {
            return Err(AppError::ValidationError(
                "La confirmación del pago es requerida".to_string(),
            ));
        }

        // Política de la plataforma: solo pasajeros con identidad verificada
        if !passenger.id_verified {
            return Err(AppError::Forbidden(
                "Debes verificar tu identidad antes de reservar".to_string(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let ride = RideRepository::find_by_id_locked(&mut tx, request.ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        if ride.status != RideStatus::Upcoming {
            return Err(AppError::ValidationError(
                "El ride ya no admite reservas".to_string(),
            ));
        }

        if ride.departure_time <= now {
            return Err(AppError::ValidationError(
                "La hora de salida del ride ya pasó".to_string(),
            ));
        }

        if ride.driver_id == passenger.user_id {
            return Err(AppError::ValidationError(
                "No puedes reservar tu propio ride".to_string(),
            ));
        }

        if BookingRepository::has_active_booking(&mut tx, ride.id, passenger.user_id).await? {
            return Err(AppError::ValidationError(
                "Ya tienes una reserva activa en este ride".to_string(),
            ));
        }

        // Pre-check de inventario para fallar con el error correcto; la
        // guardia autoritativa es el decremento condicional al aceptar
        if ride.seats_available <= 0 {
            return Err(AppError::ValidationError(
                "No seats available".to_string(),
            ));
        }

        let booking =
            BookingRepository::create(&mut tx, ride.id, passenger.user_id, ride.price_per_seat)
                .await?;

        tx.commit().await?;

        self.notifier
            .notify(
                ride.driver_id,
                kinds::BOOKING_REQUESTED,
                "Nueva solicitud de reserva",
                &format!(
                    "{} quiere reservar una plaza en tu viaje {} → {}",
                    passenger.full_name, ride.origin, ride.destination
                ),
                Some(ride.id),
                Some(booking.id),
            )
            .await;

        Ok(BookingResponse::from_booking(booking, now))
    }

    /// Transición genérica de estado (accept / decline / cancel)
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        actor: &AuthenticatedUser,
        request: UpdateBookingStatusRequest,
    ) -> Result<BookingResponse, AppError> {
        let target = BookingStatus::parse(&request.status)?;

        if target == BookingStatus::Completed {
            return Err(AppError::BadRequest(
                "Una reserva se completa mediante la confirmación del pasajero".to_string(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Primera lectura solo para resolver el ride; el estado autoritativo
        // se relee con lock más abajo
        let probe = BookingRepository::find_by_id_in_tx(&mut tx, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let ride = RideRepository::find_by_id_locked(&mut tx, probe.ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        let booking = BookingRepository::find_by_id_locked(&mut tx, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let role = self.resolve_actor(actor, &booking, &ride)?;
        authorize_transition(role, booking.status, target)?;

        // Aceptar o rechazar exige que el ride siga abierto
        if matches!(target, BookingStatus::Accepted | BookingStatus::Declined)
            && ride.status != RideStatus::Upcoming
        {
            return Err(AppError::InvalidTransition(
                "El ride ya no está en estado upcoming".to_string(),
            ));
        }

        let previous_status = booking.status;

        let updated = match target {
            BookingStatus::Accepted => {
                // Guardia autoritativa del inventario: decremento condicional
                if !RideRepository::reserve_seat(&mut tx, ride.id).await? {
                    return Err(AppError::Conflict(
                        "No quedan plazas disponibles en este ride".to_string(),
                    ));
                }

                let updated =
                    BookingRepository::update_status(&mut tx, booking_id, target).await?;

                // Ventana de confirmación endurecida: salida + 24h
                let deadline = ride.departure_time + Duration::hours(REVIEW_WINDOW_HOURS);
                BookingRepository::set_confirm_deadline(&mut tx, booking_id, deadline).await?;

                updated
            }
            BookingStatus::Declined => {
                BookingRepository::set_payment_status(&mut tx, booking_id, PaymentStatus::Refunded)
                    .await?;
                BookingRepository::update_status(&mut tx, booking_id, target).await?
            }
            BookingStatus::Cancelled => {
                // Solo una reserva aceptada ocupaba plaza
                if previous_status.occupies_seat() {
                    RideRepository::release_seat(&mut tx, ride.id).await?;
                }
                BookingRepository::set_payment_status(&mut tx, booking_id, PaymentStatus::Refunded)
                    .await?;
                BookingRepository::update_status(&mut tx, booking_id, target).await?
            }
            BookingStatus::Pending | BookingStatus::Completed => unreachable!(),
        };

        tx.commit().await?;

        self.dispatch_status_side_effects(&updated, &ride, previous_status, actor)
            .await;

        // Releer para devolver el confirm_deadline actualizado
        let fresh = self
            .repository
            .find_by_id(booking_id)
            .await?
            .unwrap_or(updated);

        Ok(BookingResponse::from_booking(fresh, now))
    }

    /// Confirmación post-viaje del pasajero: libera el pago, opcionalmente
    /// crea la review al conductor y deriva el estado agregado del ride
    pub async fn confirm(
        &self,
        booking_id: Uuid,
        passenger: &AuthenticatedUser,
        request: ConfirmBookingRequest,
    ) -> Result<ConfirmBookingResponse, AppError> {
        if let Some(rating) = request.rating {
            validate_rating(rating)
                .map_err(|_| AppError::ValidationError("El rating debe estar entre 1 y 5".to_string()))?;
        }
        if let Some(ref comment) = request.comment {
            validate_comment(comment)
                .map_err(|_| AppError::ValidationError("El comentario es demasiado largo".to_string()))?;
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let probe = BookingRepository::find_by_id_in_tx(&mut tx, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let ride = RideRepository::find_by_id_locked(&mut tx, probe.ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        let booking = BookingRepository::find_by_id_locked(&mut tx, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        if booking.passenger_id != passenger.user_id {
            return Err(AppError::Forbidden(
                "Solo el pasajero puede confirmar su reserva".to_string(),
            ));
        }

        booking.confirmation_open(ride.status, ride.departure_time, now)?;

        let confirmed = BookingRepository::confirm(&mut tx, booking_id, now).await?;

        // Review opcional al conductor, idempotente por (booking, reviewer)
        let review = match request.rating {
            Some(rating) => {
                if ReviewRepository::exists(&mut tx, booking_id, passenger.user_id).await? {
                    None
                } else {
                    Some(
                        ReviewRepository::create(
                            &mut tx,
                            booking_id,
                            passenger.user_id,
                            ride.driver_id,
                            rating,
                            request.comment.clone(),
                        )
                        .await?,
                    )
                }
            }
            None => None,
        };

        // Estado agregado del ride: sin reservas aceptadas restantes, el
        // ride queda completado
        if ride.status == RideStatus::Upcoming
            && BookingRepository::count_accepted_for_ride(&mut tx, ride.id).await? == 0
        {
            RideRepository::mark_completed(&mut tx, ride.id, now).await?;
        }

        tx.commit().await?;

        self.notifier
            .notify(
                ride.driver_id,
                kinds::BOOKING_CONFIRMED,
                "Viaje confirmado",
                &format!(
                    "{} confirmó el viaje {} → {}. El pago fue liberado.",
                    passenger.full_name, ride.origin, ride.destination
                ),
                Some(ride.id),
                Some(booking_id),
            )
            .await;

        if review.is_some() {
            self.notifier
                .notify(
                    ride.driver_id,
                    kinds::RATING_RECEIVED,
                    "Nueva valoración",
                    &format!("{} te dejó una valoración", passenger.full_name),
                    Some(ride.id),
                    Some(booking_id),
                )
                .await;
        }

        Ok(ConfirmBookingResponse {
            booking: BookingResponse::from_booking(confirmed, now),
            review: review.map(ReviewResponse::from),
        })
    }

    /// Valoración del conductor al pasajero: independiente de la
    /// confirmación y sin ventana temporal
    pub async fn rate_passenger(
        &self,
        booking_id: Uuid,
        driver: &AuthenticatedUser,
        request: RatePassengerRequest,
    ) -> Result<ApiResponse<ReviewResponse>, AppError> {
        let rating = request.rating.ok_or_else(|| {
            AppError::ValidationError("El rating es requerido".to_string())
        })?;
        validate_rating(rating)
            .map_err(|_| AppError::ValidationError("El rating debe estar entre 1 y 5".to_string()))?;
        if let Some(ref comment) = request.comment {
            validate_comment(comment)
                .map_err(|_| AppError::ValidationError("El comentario es demasiado largo".to_string()))?;
        }

        let mut tx = self.pool.begin().await?;

        let probe = BookingRepository::find_by_id_in_tx(&mut tx, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let ride = RideRepository::find_by_id_locked(&mut tx, probe.ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        let booking = BookingRepository::find_by_id_locked(&mut tx, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        if ride.driver_id != driver.user_id {
            return Err(AppError::Forbidden(
                "Solo el conductor puede valorar al pasajero".to_string(),
            ));
        }

        if !matches!(
            booking.status,
            BookingStatus::Accepted | BookingStatus::Completed
        ) {
            return Err(AppError::InvalidTransition(
                "La reserva aún no fue aceptada".to_string(),
            ));
        }

        if ReviewRepository::exists(&mut tx, booking_id, driver.user_id).await? {
            return Err(AppError::ValidationError(
                "Ya valoraste a este pasajero".to_string(),
            ));
        }

        let review = ReviewRepository::create(
            &mut tx,
            booking_id,
            driver.user_id,
            booking.passenger_id,
            rating,
            request.comment.clone(),
        )
        .await?;

        tx.commit().await?;

        self.notifier
            .notify(
                booking.passenger_id,
                kinds::RATING_RECEIVED,
                "Nueva valoración",
                &format!("{} te dejó una valoración", driver.full_name),
                Some(ride.id),
                Some(booking_id),
            )
            .await;

        Ok(ApiResponse::success_with_message(
            ReviewResponse::from(review),
            "Valoración registrada exitosamente".to_string(),
        ))
    }

    /// Leer una reserva; solo sus participantes tienen acceso
    pub async fn get_by_id(
        &self,
        booking_id: Uuid,
        actor: &AuthenticatedUser,
    ) -> Result<BookingResponse, AppError> {
        let booking = self
            .repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reserva no encontrada".to_string()))?;

        let ride = RideRepository::new(self.pool.clone())
            .find_by_id(booking.ride_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ride no encontrado".to_string()))?;

        if actor.user_id != booking.passenger_id && actor.user_id != ride.driver_id {
            return Err(AppError::Forbidden(
                "No participas en esta reserva".to_string(),
            ));
        }

        Ok(BookingResponse::from_booking(booking, Utc::now()))
    }

    /// Reservas del pasajero autenticado
    pub async fn list_for_passenger(
        &self,
        passenger: &AuthenticatedUser,
    ) -> Result<Vec<BookingResponse>, AppError> {
        let now = Utc::now();
        let bookings = self.repository.list_for_passenger(passenger.user_id).await?;

        Ok(bookings
            .into_iter()
            .map(|b| BookingResponse::from_booking(b, now))
            .collect())
    }

    fn resolve_actor(
        &self,
        actor: &AuthenticatedUser,
        booking: &Booking,
        ride: &Ride,
    ) -> Result<BookingActor, AppError> {
        if actor.user_id == ride.driver_id {
            Ok(BookingActor::Driver)
        } else if actor.user_id == booking.passenger_id {
            Ok(BookingActor::Passenger)
        } else {
            Err(AppError::Forbidden(
                "No participas en esta reserva".to_string(),
            ))
        }
    }

    async fn dispatch_status_side_effects(
        &self,
        booking: &Booking,
        ride: &Ride,
        previous_status: BookingStatus,
        actor: &AuthenticatedUser,
    ) {
        match booking.status {
            BookingStatus::Accepted => {
                self.notifier
                    .system_message(
                        ride.id,
                        &format!("Se aceptó una reserva: queda(n) {} plaza(s)", ride.seats_available - 1),
                    )
                    .await;
                self.notifier
                    .notify(
                        booking.passenger_id,
                        kinds::BOOKING_ACCEPTED,
                        "Reserva aceptada",
                        &format!(
                            "Tu reserva en el viaje {} → {} fue aceptada",
                            ride.origin, ride.destination
                        ),
                        Some(ride.id),
                        Some(booking.id),
                    )
                    .await;
            }
            BookingStatus::Declined => {
                self.notifier
                    .notify(
                        booking.passenger_id,
                        kinds::BOOKING_DECLINED,
                        "Reserva rechazada",
                        &format!(
                            "Tu reserva en el viaje {} → {} fue rechazada",
                            ride.origin, ride.destination
                        ),
                        Some(ride.id),
                        Some(booking.id),
                    )
                    .await;
            }
            BookingStatus::Cancelled => {
                if previous_status.occupies_seat() {
                    self.notifier
                        .system_message(
                            ride.id,
                            &format!("{} canceló su reserva", actor.full_name),
                        )
                        .await;
                }
                self.notifier
                    .notify(
                        ride.driver_id,
                        kinds::BOOKING_CANCELLED,
                        "Reserva cancelada",
                        &format!(
                            "{} canceló su reserva en el viaje {} → {}",
                            actor.full_name, ride.origin, ride.destination
                        ),
                        Some(ride.id),
                        Some(booking.id),
                    )
                    .await;
            }
            _ => {}
        }
    }
}
