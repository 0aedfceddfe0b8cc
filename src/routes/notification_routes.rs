use axum::{
    extract::{Extension, State},
    middleware,
    routing::get,
    Json, Router,
};

use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::models::notification::Notification;
use crate::repositories::notification_repository::NotificationRepository;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_notification_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn list_notifications(
    Extension(user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let repository = NotificationRepository::new(state.pool.clone());
    let notifications = repository.list_for_recipient(user.user_id).await?;
    Ok(Json(notifications))
}
