//! Services module
//!
//! Este módulo contiene la lógica de side effects de la aplicación:
//! notificaciones y mensajes de sistema despachados tras el commit.

pub mod notification_service;

pub use notification_service::*;
