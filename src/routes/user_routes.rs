use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::dto::booking_dto::ReviewResponse;
use crate::repositories::review_repository::ReviewRepository;
use crate::repositories::user_repository::UserRepository;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_user_router() -> Router<AppState> {
    Router::new().route("/:id/reviews", get(list_reviews))
}

/// Reviews recibidas por un usuario (perfil público)
async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, AppError> {
    UserRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    let reviews = ReviewRepository::new(state.pool.clone())
        .list_for_reviewee(id)
        .await?;

    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}
