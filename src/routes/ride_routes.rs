use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::ride_controller::RideController;
use crate::dto::booking_dto::BookingResponse;
use crate::dto::ApiResponse;
use crate::dto::ride_dto::{
    CreateRideRequest, MessageResponse, RideDetailResponse, RideFilters, RideResponse,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

use super::build_notifier;

pub fn create_ride_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_rides))
        .route("/:id", get(get_ride));

    let protected = Router::new()
        .route("/", post(create_ride))
        .route("/:id/messages", get(list_messages))
        .route("/:id/bookings", get(list_bookings))
        .route("/:id/complete", post(mark_completed))
        .route("/:id/cancel", post(cancel_ride))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

async fn create_ride(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateRideRequest>,
) -> Result<(StatusCode, Json<RideResponse>), AppError> {
    let controller = RideController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_rides(
    State(state): State<AppState>,
    Query(filters): Query<RideFilters>,
) -> Result<Json<Vec<RideResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.list(filters).await?;
    Ok(Json(response))
}

async fn get_ride(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RideDetailResponse>, AppError> {
    let controller = RideController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.get_detail(id).await?;
    Ok(Json(response))
}

async fn list_messages(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.list_messages(id, &user).await?;
    Ok(Json(response))
}

async fn list_bookings(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.list_bookings(id, &user).await?;
    Ok(Json(response))
}

async fn mark_completed(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RideResponse>, AppError> {
    let controller = RideController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.mark_completed(id, &user).await?;
    Ok(Json(response))
}

async fn cancel_ride(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RideResponse>>, AppError> {
    let controller = RideController::new(state.pool.clone(), build_notifier(&state));
    let response = controller.cancel(id, &user).await?;
    Ok(Json(response))
}
