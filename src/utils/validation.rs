//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::ValidationError;
use serde::Serialize;

/// Validar y convertir string a UUID
pub fn validate_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
        error
    })
}

/// Validar y convertir string a datetime
pub fn validate_datetime(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"RFC3339".to_string());
            error
        })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor esté en un rango específico
pub fn validate_range<T: PartialOrd + std::fmt::Display + serde::Serialize>(
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un rating esté entre 1 y 5 inclusive
pub fn validate_rating(value: i32) -> Result<(), ValidationError> {
    if !(1..=5).contains(&value) {
        let mut error = ValidationError::new("rating");
        error.add_param("value".into(), &value);
        error.add_param("range".into(), &"1 to 5".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar longitud máxima de un comentario de review
pub fn validate_comment(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > 1000 {
        let mut error = ValidationError::new("comment");
        error.add_param("max".into(), &1000);
        error.add_param("actual".into(), &value.chars().count());
        return Err(error);
    }
    Ok(())
}

/// Validar que una fecha de salida esté en el futuro
pub fn validate_future_departure(
    departure: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if departure <= now {
        let mut error = ValidationError::new("departure");
        error.add_param("value".into(), &departure.to_rfc3339());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar número de plazas de un ride
pub fn validate_seats(value: i32) -> Result<(), ValidationError> {
    if !(1..=8).contains(&value) {
        let mut error = ValidationError::new("seats");
        error.add_param("value".into(), &value);
        error.add_param("range".into(), &"1 to 8".to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_uuid() {
        let valid_uuid = "550e8400-e29b-41d4-a716-446655440000";
        assert!(validate_uuid(valid_uuid).is_ok());

        let invalid_uuid = "invalid-uuid";
        assert!(validate_uuid(invalid_uuid).is_err());
    }

    #[test]
    fn test_validate_datetime() {
        assert!(validate_datetime("2025-06-01T10:00:00Z").is_ok());
        assert!(validate_datetime("2025-06-01 10:00").is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-3).is_err());
    }

    #[test]
    fn test_validate_comment() {
        assert!(validate_comment("buen viaje").is_ok());
        assert!(validate_comment(&"a".repeat(1000)).is_ok());
        assert!(validate_comment(&"a".repeat(1001)).is_err());
    }

    #[test]
    fn test_validate_future_departure() {
        let now = Utc::now();
        assert!(validate_future_departure(now + Duration::hours(1), now).is_ok());
        assert!(validate_future_departure(now - Duration::hours(1), now).is_err());
        assert!(validate_future_departure(now, now).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(5, 1, 10).is_ok());
        assert!(validate_range(0, 1, 10).is_err());
        assert!(validate_range(15, 1, 10).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(5).is_ok());
        assert!(validate_positive(0).is_err());
        assert!(validate_positive(-5).is_err());
    }

    #[test]
    fn test_validate_seats() {
        assert!(validate_seats(1).is_ok());
        assert!(validate_seats(8).is_ok());
        assert!(validate_seats(0).is_err());
        assert!(validate_seats(9).is_err());
    }
}
