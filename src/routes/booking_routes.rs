use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingResponse, ConfirmBookingRequest, ConfirmBookingResponse, CreateBookingRequest,
    RatePassengerRequest, ReviewResponse, UpdateBookingStatusRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::build_notifier;

pub fn create_booking_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_bookings))
        .route("/:id", get(get_booking))
        .route("/:id/status", put(update_booking_status))
        .route("/:id/confirm", post(confirm_booking))
        .route("/:id/rate", post(rate_passenger))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let controller = BookingController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_bookings(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.list_for_passenger(&user).await?;
    Ok(Json(response))
}

async fn get_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.get_by_id(id, &user).await?;
    Ok(Json(response))
}

async fn update_booking_status(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.update_status(id, &user, request).await?;
    Ok(Json(response))
}

async fn confirm_booking(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmBookingRequest>,
) -> Result<Json<ConfirmBookingResponse>, AppError> {
    let controller = BookingController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.confirm(id, &user, request).await?;
    Ok(Json(response))
}

async fn rate_passenger(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RatePassengerRequest>,
) -> Result<Json<ApiResponse<ReviewResponse>>, AppError> {
    let controller = BookingController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.rate_passenger(id, &user, request).await?;
    Ok(Json(response))
}
