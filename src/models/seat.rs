//! Modelo del mapa de asientos
//!
//! Cada ruta posee un mapa de tamaño fijo de `SEAT_COUNT` asientos,
//! indexados `0..SEAT_COUNT`. Un asiento ocupado siempre conoce a su
//! ocupante: el invariante "occupant iff occupied" está codificado en el
//! enum, no en un par bool/nullable.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Cantidad fija de asientos por furgoneta
pub const SEAT_COUNT: usize = 12;

/// Estado de un asiento. La única transición es `Free -> Occupied`;
/// no existe liberación dentro de la vida de la ruta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeatState {
    Free,
    Occupied { occupant: Uuid },
}

impl SeatState {
    pub fn is_occupied(&self) -> bool {
        matches!(self, SeatState::Occupied { .. })
    }

    pub fn occupant(&self) -> Option<Uuid> {
        match self {
            SeatState::Free => None,
            SeatState::Occupied { occupant } => Some(*occupant),
        }
    }
}

/// Errores de transición sobre el mapa de asientos
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeatError {
    #[error("seat {index} is out of range (0..{count})")]
    OutOfRange { index: usize, count: usize },

    #[error("seat {index} is already occupied")]
    Occupied { index: usize },
}

/// Mapa de ocupación de una ruta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatMap {
    seats: Vec<SeatState>,
}

impl SeatMap {
    /// Mapa nuevo con todos los asientos libres
    pub fn new() -> Self {
        Self {
            seats: vec![SeatState::Free; SEAT_COUNT],
        }
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<SeatState> {
        self.seats.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, SeatState)> + '_ {
        self.seats.iter().copied().enumerate()
    }

    /// Escritura condicional: solo acepta el reclamo si el asiento sigue
    /// libre en el momento de la escritura.
    pub fn claim(&mut self, index: usize, occupant: Uuid) -> Result<(), SeatError> {
        let count = self.seats.len();
        let seat = self
            .seats
            .get_mut(index)
            .ok_or(SeatError::OutOfRange { index, count })?;

        if seat.is_occupied() {
            return Err(SeatError::Occupied { index });
        }

        *seat = SeatState::Occupied { occupant };
        Ok(())
    }

    /// Asiento reservado por un usuario en este mapa, si existe
    pub fn seat_of(&self, occupant: Uuid) -> Option<usize> {
        self.seats
            .iter()
            .position(|seat| seat.occupant() == Some(occupant))
    }

    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_occupied()).count()
    }

    pub fn is_full(&self) -> bool {
        self.occupied_count() == self.seats.len()
    }

    /// Reconstruye un mapa desde estado persistido ya validado
    pub fn from_states(seats: Vec<SeatState>) -> Self {
        debug_assert_eq!(seats.len(), SEAT_COUNT);
        Self { seats }
    }
}

impl Default for SeatMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_map_is_all_free() {
        let map = SeatMap::new();
        assert_eq!(map.len(), SEAT_COUNT);
        assert_eq!(map.occupied_count(), 0);
        assert!(map.iter().all(|(_, seat)| !seat.is_occupied()));
    }

    #[test]
    fn test_claim_marks_occupant() {
        let mut map = SeatMap::new();
        let user = Uuid::new_v4();

        map.claim(5, user).unwrap();
        assert_eq!(map.get(5), Some(SeatState::Occupied { occupant: user }));
        assert_eq!(map.seat_of(user), Some(5));
        assert_eq!(map.occupied_count(), 1);
    }

    #[test]
    fn test_claim_occupied_seat_fails() {
        let mut map = SeatMap::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        map.claim(3, first).unwrap();
        let err = map.claim(3, second).unwrap_err();
        assert_eq!(err, SeatError::Occupied { index: 3 });
        // El reclamo rechazado no toca el estado
        assert_eq!(map.get(3), Some(SeatState::Occupied { occupant: first }));
    }

    #[test]
    fn test_reclaim_by_same_user_fails() {
        // Un usuario que ya ocupa el asiento tampoco puede reclamarlo de nuevo
        let mut map = SeatMap::new();
        let user = Uuid::new_v4();

        map.claim(0, user).unwrap();
        assert_eq!(map.claim(0, user), Err(SeatError::Occupied { index: 0 }));
    }

    #[test]
    fn test_claim_out_of_range_fails() {
        let mut map = SeatMap::new();
        let err = map.claim(SEAT_COUNT, Uuid::new_v4()).unwrap_err();
        assert_eq!(
            err,
            SeatError::OutOfRange {
                index: SEAT_COUNT,
                count: SEAT_COUNT
            }
        );
    }

    #[test]
    fn test_map_fills_after_seat_count_claims() {
        let mut map = SeatMap::new();
        for index in 0..SEAT_COUNT {
            map.claim(index, Uuid::new_v4()).unwrap();
        }
        assert!(map.is_full());
        for index in 0..SEAT_COUNT {
            assert!(matches!(
                map.claim(index, Uuid::new_v4()),
                Err(SeatError::Occupied { .. })
            ));
        }
    }
}
