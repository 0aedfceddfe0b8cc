//! Modelo de Message
//!
//! Mensajes del chat de un ride. sender_id NULL identifica los mensajes
//! de sistema que emite el motor de reservas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Message - mapea exactamente a la tabla messages
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
