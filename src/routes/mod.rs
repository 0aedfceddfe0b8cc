//! Rutas de la API
//!
//! Cada recurso expone su propio router; los routers protegidos aplican
//! el middleware de autenticación JWT.

pub mod auth_routes;
pub mod booking_routes;
pub mod notification_routes;
pub mod ride_routes;
pub mod user_routes;

use crate::services::notification_service::NotificationService;
use crate::state::AppState;

/// Construir el emisor de notificaciones a partir del estado compartido
pub(crate) fn build_notifier(state: &AppState) -> NotificationService {
    NotificationService::new(
        state.pool.clone(),
        state.http_client.clone(),
        state.config.notification_webhook_url.clone(),
    )
}
