//! Modelo de Route
//!
//! Una ruta es un punto geográfico con nombre publicado por un conductor.
//! El punto es inmutable una vez creada la ruta; borrar la ruta destruye
//! también su mapa de asientos (propiedad del ledger).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Punto geográfico de una ruta
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl RoutePoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Coordenadas dentro del rango WGS84
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Route principal - registro del Route Registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub name: String,
    pub point: RoutePoint,
    pub created_at: DateTime<Utc>,
}

impl Route {
    pub fn new(name: String, point: RoutePoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            point,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_point_ranges() {
        assert!(RoutePoint::new(-23.5, -46.6).is_valid());
        assert!(RoutePoint::new(90.0, 180.0).is_valid());
        assert!(!RoutePoint::new(90.5, 0.0).is_valid());
        assert!(!RoutePoint::new(0.0, -180.1).is_valid());
    }

    #[test]
    fn test_new_route_has_fresh_identity() {
        let a = Route::new("Rota 1".to_string(), RoutePoint::new(-23.5, -46.6));
        let b = Route::new("Rota 1".to_string(), RoutePoint::new(-23.5, -46.6));
        assert_ne!(a.id, b.id);
    }
}
