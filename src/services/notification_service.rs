//! Servicio de notificaciones y mensajes de sistema
//!
//! Emisor de side effects del ciclo de vida: se invoca después del commit
//! de cada transición y es best-effort. Un fallo aquí se degrada a log,
//! nunca revierte el estado ya comprometido.

use reqwest::Client;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repositories::message_repository::MessageRepository;
use crate::repositories::notification_repository::NotificationRepository;

/// Tipos de notificación del ciclo de vida de la reserva
pub mod kinds {
    pub const BOOKING_REQUESTED: &str = "booking_requested";
    pub const BOOKING_ACCEPTED: &str = "booking_accepted";
    pub const BOOKING_DECLINED: &str = "booking_declined";
    pub const BOOKING_CANCELLED: &str = "booking_cancelled";
    pub const BOOKING_CONFIRMED: &str = "booking_confirmed";
    pub const RIDE_COMPLETED: &str = "ride_completed";
    pub const RIDE_CANCELLED: &str = "ride_cancelled";
    pub const RATING_RECEIVED: &str = "rating_received";
}

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    http_client: Client,
    webhook_url: Option<String>,
}

impl NotificationService {
    pub fn new(pool: PgPool, http_client: Client, webhook_url: Option<String>) -> Self {
        Self {
            pool,
            http_client,
            webhook_url,
        }
    }

    /// Notificar a un participante. Best-effort: el fallo se loggea y se
    /// continúa.
    pub async fn notify(
        &self,
        recipient_id: Uuid,
        kind: &str,
        title: &str,
        body: &str,
        ride_id: Option<Uuid>,
        booking_id: Option<Uuid>,
    ) {
        let repository = NotificationRepository::new(self.pool.clone());

        if let Err(e) = repository
            .insert(recipient_id, kind, title, body, ride_id, booking_id)
            .await
        {
            log::warn!(
                "No se pudo guardar la notificación '{}' para {}: {}",
                kind,
                recipient_id,
                e
            );
        }

        self.forward_to_webhook(recipient_id, kind, title, body).await;
    }

    /// Publicar un mensaje de sistema en el chat del ride. Best-effort.
    pub async fn system_message(&self, ride_id: Uuid, content: &str) {
        let repository = MessageRepository::new(self.pool.clone());

        if let Err(e) = repository.insert(ride_id, None, content).await {
            log::warn!(
                "No se pudo publicar el mensaje de sistema en el ride {}: {}",
                ride_id,
                e
            );
        }
    }

    /// Reenvío opcional al webhook de push configurado
    async fn forward_to_webhook(&self, recipient_id: Uuid, kind: &str, title: &str, body: &str) {
        let Some(url) = &self.webhook_url else {
            return;
        };

        let payload = json!({
            "recipient_id": recipient_id,
            "kind": kind,
            "title": title,
            "body": body,
        });

        if let Err(e) = self.http_client.post(url).json(&payload).send().await {
            log::warn!("Webhook de notificaciones no disponible: {}", e);
        }
    }
}
