//! Utilidades de validación
//!
//! Funciones helper para validar datos en la frontera HTTP antes de que
//! entren al núcleo tipado.

use uuid::Uuid;
use validator::ValidationError;

use crate::models::route::RoutePoint;
use crate::models::seat::SEAT_COUNT;

/// Validar y convertir string a UUID
pub fn validate_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
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

/// Validar un par de coordenadas WGS84
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ValidationError> {
    if !RoutePoint::new(latitude, longitude).is_valid() {
        let mut error = ValidationError::new("coordinates");
        error.add_param("latitude".into(), &latitude);
        error.add_param("longitude".into(), &longitude);
        return Err(error);
    }
    Ok(())
}

/// Validar un índice de asiento
pub fn validate_seat_index(index: usize) -> Result<(), ValidationError> {
    if index >= SEAT_COUNT {
        let mut error = ValidationError::new("seat_index");
        error.add_param("index".into(), &index);
        error.add_param("max".into(), &(SEAT_COUNT - 1));
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(validate_coordinates(-23.5, -46.6).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, 181.0).is_err());
    }

    #[test]
    fn test_seat_index_validation() {
        assert!(validate_seat_index(0).is_ok());
        assert!(validate_seat_index(SEAT_COUNT - 1).is_ok());
        assert!(validate_seat_index(SEAT_COUNT).is_err());
    }
}
