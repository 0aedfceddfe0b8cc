//! Repositorios de acceso a datos
//!
//! Las operaciones que forman parte de una transición de estado reciben
//! la transacción del caller; las lecturas sueltas usan el pool.

pub mod booking_repository;
pub mod message_repository;
pub mod notification_repository;
pub mod review_repository;
pub mod ride_repository;
pub mod user_repository;
