use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::seat::SeatMap;

/// Un asiento del mapa, en la forma plana que consume el cliente
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatResponse {
    pub index: usize,
    pub occupied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant_id: Option<String>,
}

/// Snapshot del mapa de asientos de una ruta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMapResponse {
    pub route_id: String,
    pub seats: Vec<SeatResponse>,
    pub occupied_count: usize,
}

impl SeatMapResponse {
    pub fn new(route_id: Uuid, map: &SeatMap) -> Self {
        let seats = map
            .iter()
            .map(|(index, seat)| SeatResponse {
                index,
                occupied: seat.is_occupied(),
                occupant_id: seat.occupant().map(|id| id.to_string()),
            })
            .collect();

        Self {
            route_id: route_id.to_string(),
            seats,
            occupied_count: map.occupied_count(),
        }
    }
}

/// Reserva propia del usuario autenticado en una ruta
#[derive(Debug, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub route_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_index: Option<usize>,
}
