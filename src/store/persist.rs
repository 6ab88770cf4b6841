//! Snapshot persistido del almacén
//!
//! Documento JSON con rutas bajo claves generadas (nombre, latitud,
//! longitud, timestamp en milisegundos), la ocupación de asientos anidada
//! por índice, y el directorio de credenciales. Esta es la frontera donde
//! entran datos sin tipar al
//! núcleo: cada campo se valida y un registro inválido se rechaza con
//! `Malformed` en lugar de propagar nulos.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::route::{Route, RoutePoint};
use crate::models::seat::{SeatMap, SeatState, SEAT_COUNT};
use crate::models::user::{UserRecord, UserRole};

use super::{StoreError, StoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSeat {
    pub occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedRoute {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Milisegundos desde época
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub seats: BTreeMap<String, PersistedSeat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Documento completo del snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub routes: BTreeMap<String, PersistedRoute>,
    #[serde(default)]
    pub users: BTreeMap<String, PersistedUser>,
}

impl PersistedState {
    /// Valida el documento y lo convierte a registros tipados del núcleo.
    pub fn decode(self) -> StoreResult<(Vec<(Route, SeatMap)>, Vec<UserRecord>)> {
        let mut records = Vec::with_capacity(self.routes.len());
        for (key, persisted) in self.routes {
            records.push(decode_route(&key, persisted)?);
        }

        let mut users = Vec::with_capacity(self.users.len());
        for (key, persisted) in self.users {
            users.push(decode_user(&key, persisted)?);
        }

        Ok((records, users))
    }

    /// Construye el documento desde el estado en memoria.
    pub fn encode(records: &[(Route, SeatMap)], users: &[UserRecord]) -> Self {
        let routes = records
            .iter()
            .map(|(route, seats)| {
                let persisted_seats = seats
                    .iter()
                    .filter(|(_, seat)| seat.is_occupied())
                    .map(|(index, seat)| {
                        (
                            index.to_string(),
                            PersistedSeat {
                                occupied: true,
                                occupant_id: seat.occupant().map(|id| id.to_string()),
                            },
                        )
                    })
                    .collect();

                (
                    route.id.to_string(),
                    PersistedRoute {
                        name: route.name.clone(),
                        latitude: route.point.latitude,
                        longitude: route.point.longitude,
                        timestamp: route.created_at.timestamp_millis(),
                        seats: persisted_seats,
                    },
                )
            })
            .collect();

        let users = users
            .iter()
            .map(|user| {
                (
                    user.id.to_string(),
                    PersistedUser {
                        email: user.email.clone(),
                        password_hash: user.password_hash.clone(),
                        role: user.role.as_str().to_string(),
                    },
                )
            })
            .collect();

        Self { routes, users }
    }
}

fn decode_route(key: &str, persisted: PersistedRoute) -> StoreResult<(Route, SeatMap)> {
    let id = Uuid::parse_str(key)
        .map_err(|_| StoreError::Malformed(format!("route key '{}' is not a valid id", key)))?;

    let name = persisted.name.trim().to_string();
    if name.is_empty() {
        return Err(StoreError::Malformed(format!(
            "route '{}' has an empty name",
            key
        )));
    }

    let point = RoutePoint::new(persisted.latitude, persisted.longitude);
    if !point.is_valid() {
        return Err(StoreError::Malformed(format!(
            "route '{}' has coordinates out of range ({}, {})",
            name, persisted.latitude, persisted.longitude
        )));
    }

    let created_at = Utc
        .timestamp_millis_opt(persisted.timestamp)
        .single()
        .ok_or_else(|| {
            StoreError::Malformed(format!("route '{}' has an invalid timestamp", name))
        })?;

    let mut states = vec![SeatState::Free; SEAT_COUNT];
    for (seat_key, seat) in persisted.seats {
        let index: usize = seat_key.parse().map_err(|_| {
            StoreError::Malformed(format!(
                "route '{}': seat key '{}' is not an index",
                name, seat_key
            ))
        })?;
        if index >= SEAT_COUNT {
            return Err(StoreError::Malformed(format!(
                "route '{}': seat index {} out of range (0..{})",
                name, index, SEAT_COUNT
            )));
        }

        states[index] = decode_seat(&name, index, seat)?;
    }

    let route = Route {
        id,
        name,
        point,
        created_at,
    };
    Ok((route, SeatMap::from_states(states)))
}

fn decode_seat(route_name: &str, index: usize, seat: PersistedSeat) -> StoreResult<SeatState> {
    match (seat.occupied, seat.occupant_id) {
        (true, Some(raw)) => {
            let occupant = Uuid::parse_str(&raw).map_err(|_| {
                StoreError::Malformed(format!(
                    "route '{}': seat {} has an invalid occupant id",
                    route_name, index
                ))
            })?;
            Ok(SeatState::Occupied { occupant })
        }
        // occupant sí y solo sí occupied: cualquier otra combinación es basura
        (true, None) => Err(StoreError::Malformed(format!(
            "route '{}': seat {} is occupied without an occupant",
            route_name, index
        ))),
        (false, Some(_)) => Err(StoreError::Malformed(format!(
            "route '{}': seat {} has an occupant but is not occupied",
            route_name, index
        ))),
        (false, None) => Ok(SeatState::Free),
    }
}

fn decode_user(key: &str, persisted: PersistedUser) -> StoreResult<UserRecord> {
    let id = Uuid::parse_str(key)
        .map_err(|_| StoreError::Malformed(format!("user key '{}' is not a valid id", key)))?;

    if !persisted.email.contains('@') {
        return Err(StoreError::Malformed(format!(
            "user '{}' has an invalid email",
            key
        )));
    }
    if persisted.password_hash.trim().is_empty() {
        return Err(StoreError::Malformed(format!(
            "user '{}' has an empty password hash",
            persisted.email
        )));
    }

    let role = UserRole::from_str(&persisted.role).ok_or_else(|| {
        StoreError::Malformed(format!(
            "user '{}' has an unknown role '{}'",
            persisted.email, persisted.role
        ))
    })?;

    Ok(UserRecord {
        id,
        email: persisted.email,
        password_hash: persisted.password_hash,
        role,
    })
}

/// Lee el snapshot si existe. `None` significa "sin datos todavía";
/// un error de IO significa almacén inaccesible, no snapshot vacío.
pub async fn load(path: &Path) -> StoreResult<Option<PersistedState>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let state: PersistedState = serde_json::from_slice(&bytes).map_err(|err| {
                StoreError::Malformed(format!("snapshot {}: {}", path.display(), err))
            })?;
            Ok(Some(state))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => {
            log::error!("❌ No se pudo leer el snapshot {}: {}", path.display(), err);
            Err(StoreError::Unavailable)
        }
    }
}

pub async fn save(path: &Path, state: &PersistedState) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(state)
        .map_err(|err| StoreError::Malformed(format!("snapshot encode: {}", err)))?;
    tokio::fs::write(path, bytes).await.map_err(|err| {
        log::error!("❌ No se pudo escribir el snapshot {}: {}", path.display(), err);
        StoreError::Unavailable
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted_route(name: &str) -> PersistedRoute {
        PersistedRoute {
            name: name.to_string(),
            latitude: -23.5,
            longitude: -46.6,
            timestamp: 1_722_988_800_000,
            seats: BTreeMap::new(),
        }
    }

    #[test]
    fn test_decode_restores_routes_and_seats() {
        let occupant = Uuid::new_v4();
        let mut route = persisted_route("Rota 1");
        route.seats.insert(
            "5".to_string(),
            PersistedSeat {
                occupied: true,
                occupant_id: Some(occupant.to_string()),
            },
        );

        let mut state = PersistedState::default();
        state.routes.insert(Uuid::new_v4().to_string(), route);

        let (records, _) = state.decode().unwrap();
        assert_eq!(records.len(), 1);
        let (route, seats) = &records[0];
        assert_eq!(route.name, "Rota 1");
        assert_eq!(seats.get(5), Some(SeatState::Occupied { occupant }));
        assert_eq!(seats.occupied_count(), 1);
    }

    #[test]
    fn test_occupant_without_occupied_flag_is_malformed() {
        let mut route = persisted_route("Rota 1");
        route.seats.insert(
            "2".to_string(),
            PersistedSeat {
                occupied: false,
                occupant_id: Some(Uuid::new_v4().to_string()),
            },
        );

        let mut state = PersistedState::default();
        state.routes.insert(Uuid::new_v4().to_string(), route);

        assert!(matches!(
            state.decode().unwrap_err(),
            StoreError::Malformed(_)
        ));
    }

    #[test]
    fn test_occupied_without_occupant_is_malformed() {
        let mut route = persisted_route("Rota 1");
        route.seats.insert(
            "0".to_string(),
            PersistedSeat {
                occupied: true,
                occupant_id: None,
            },
        );

        let mut state = PersistedState::default();
        state.routes.insert(Uuid::new_v4().to_string(), route);

        assert!(matches!(
            state.decode().unwrap_err(),
            StoreError::Malformed(_)
        ));
    }

    #[test]
    fn test_empty_name_and_bad_coordinates_are_malformed() {
        let mut state = PersistedState::default();
        state
            .routes
            .insert(Uuid::new_v4().to_string(), persisted_route("   "));
        assert!(matches!(
            state.decode().unwrap_err(),
            StoreError::Malformed(_)
        ));

        let mut bad_point = persisted_route("Rota 1");
        bad_point.latitude = 123.0;
        let mut state = PersistedState::default();
        state.routes.insert(Uuid::new_v4().to_string(), bad_point);
        assert!(matches!(
            state.decode().unwrap_err(),
            StoreError::Malformed(_)
        ));
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let mut state = PersistedState::default();
        state.users.insert(
            Uuid::new_v4().to_string(),
            PersistedUser {
                email: "ana@vancontrol.app".to_string(),
                password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
                role: "admin".to_string(),
            },
        );

        assert!(matches!(
            state.decode().unwrap_err(),
            StoreError::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file_means_no_data_yet() {
        let path = std::env::temp_dir().join(format!("vancontrol-{}.json", Uuid::new_v4()));
        assert!(load(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let path = std::env::temp_dir().join(format!("vancontrol-{}.json", Uuid::new_v4()));
        let route = Route::new("Rota 1".to_string(), RoutePoint::new(-23.5, -46.6));
        let mut seats = SeatMap::new();
        let occupant = Uuid::new_v4();
        seats.claim(5, occupant).unwrap();

        let state = PersistedState::encode(&[(route.clone(), seats)], &[]);
        save(&path, &state).await.unwrap();

        let loaded = load(&path).await.unwrap().unwrap();
        let (records, users) = loaded.decode().unwrap();
        assert!(users.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0.id, route.id);
        assert_eq!(
            records[0].1.get(5),
            Some(SeatState::Occupied { occupant })
        );

        let _ = tokio::fs::remove_file(&path).await;
    }
}
