//! Almacén en vivo en memoria
//!
//! Implementación única de `RouteRegistry`, `ReservationLedger` y
//! `LiveFeed`. Todo el interior vive bajo un solo `RwLock`: rutas y mapas
//! de asientos se crean y destruyen bajo el mismo candado, así un borrado
//! es atómico para los observadores (nunca se ve una ruta sin su mapa ni
//! al revés), y dos reclamos simultáneos del mismo asiento se serializan
//! en una escritura condicional con exactamente un ganador.
//!
//! Los feeds difunden el snapshot completo tras cada commit, con el
//! receptor creado bajo el mismo candado que lee el snapshot inicial:
//! ninguna notificación puede colarse entre ambos.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::models::route::Route;
use crate::models::seat::SeatMap;

use super::{
    LiveFeed, NewRoute, ReservationLedger, RouteFeed, RouteRegistry, SeatEvent, SeatFeed,
    StoreError, StoreResult,
};

/// Snapshots retenidos por canal antes de que un receptor rezagado
/// empiece a saltarse entregas intermedias
const FEED_CAPACITY: usize = 64;

struct RouteEntry {
    route: Route,
    seats: SeatMap,
    seats_tx: broadcast::Sender<SeatEvent>,
}

struct Inner {
    routes: HashMap<Uuid, RouteEntry>,
    /// Ids en orden de creación; `list_routes` y los feeds lo respetan
    order: Vec<Uuid>,
    routes_tx: broadcast::Sender<Vec<Route>>,
    closed: bool,
}

impl Inner {
    fn snapshot(&self) -> Vec<Route> {
        self.order
            .iter()
            .filter_map(|id| self.routes.get(id).map(|entry| entry.route.clone()))
            .collect()
    }

    fn broadcast_routes(&self) {
        // Sin suscriptores no hay nada que entregar
        let _ = self.routes_tx.send(self.snapshot());
    }

    fn guard_open(&self) -> StoreResult<()> {
        if self.closed {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (routes_tx, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            inner: RwLock::new(Inner {
                routes: HashMap::new(),
                order: Vec::new(),
                routes_tx,
                closed: false,
            }),
        }
    }

    /// Reconstruye el almacén desde un snapshot persistido ya validado.
    /// El orden de creación se recupera del timestamp de cada ruta.
    pub fn from_records(mut records: Vec<(Route, SeatMap)>) -> Self {
        records.sort_by(|a, b| {
            a.0.created_at
                .cmp(&b.0.created_at)
                .then_with(|| a.0.name.cmp(&b.0.name))
        });

        let (routes_tx, _) = broadcast::channel(FEED_CAPACITY);
        let mut routes = HashMap::new();
        let mut order = Vec::new();
        for (route, seats) in records {
            let (seats_tx, _) = broadcast::channel(FEED_CAPACITY);
            order.push(route.id);
            routes.insert(
                route.id,
                RouteEntry {
                    route,
                    seats,
                    seats_tx,
                },
            );
        }

        Self {
            inner: RwLock::new(Inner {
                routes,
                order,
                routes_tx,
                closed: false,
            }),
        }
    }

    /// Marca el almacén como no disponible y cierra todos los feeds de
    /// asientos con su notificación terminal. Las operaciones posteriores
    /// fallan con `Unavailable`.
    pub async fn close(&self) {
        let mut inner = self.inner.write().await;
        if inner.closed {
            return;
        }
        inner.closed = true;
        for entry in inner.routes.values() {
            let _ = entry.seats_tx.send(SeatEvent::Unavailable);
        }
        log::info!("🔒 Almacén en vivo cerrado; feeds terminados");
    }

    /// Estado completo para persistencia. Funciona también tras `close`,
    /// que es justamente cuando se guarda el snapshot.
    pub async fn export_records(&self) -> Vec<(Route, SeatMap)> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .filter_map(|id| {
                inner
                    .routes
                    .get(id)
                    .map(|entry| (entry.route.clone(), entry.seats.clone()))
            })
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteRegistry for MemoryStore {
    async fn create_route(&self, new_route: NewRoute) -> StoreResult<Route> {
        let mut inner = self.inner.write().await;
        inner.guard_open()?;

        if inner
            .routes
            .values()
            .any(|entry| entry.route.name == new_route.name)
        {
            return Err(StoreError::DuplicateName(new_route.name));
        }

        let route = Route::new(new_route.name, new_route.point);
        let (seats_tx, _) = broadcast::channel(FEED_CAPACITY);
        inner.order.push(route.id);
        inner.routes.insert(
            route.id,
            RouteEntry {
                route: route.clone(),
                seats: SeatMap::new(),
                seats_tx,
            },
        );
        inner.broadcast_routes();

        log::info!(
            "🗺️ Ruta '{}' registrada en ({}, {})",
            route.name,
            route.point.latitude,
            route.point.longitude
        );
        Ok(route)
    }

    async fn delete_route(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.guard_open()?;

        let entry = inner.routes.remove(&id).ok_or(StoreError::RouteNotFound)?;
        inner.order.retain(|route_id| *route_id != id);

        // Notificación terminal para los observadores del mapa; al soltar
        // el sender el canal queda cerrado para cualquier rezagado.
        let _ = entry.seats_tx.send(SeatEvent::Unavailable);
        inner.broadcast_routes();

        log::info!("🗑️ Ruta '{}' eliminada junto con su mapa de asientos", entry.route.name);
        Ok(())
    }

    async fn list_routes(&self) -> StoreResult<Vec<Route>> {
        let inner = self.inner.read().await;
        inner.guard_open()?;
        Ok(inner.snapshot())
    }

    async fn get_route(&self, id: Uuid) -> StoreResult<Route> {
        let inner = self.inner.read().await;
        inner.guard_open()?;
        inner
            .routes
            .get(&id)
            .map(|entry| entry.route.clone())
            .ok_or(StoreError::RouteNotFound)
    }
}

#[async_trait]
impl ReservationLedger for MemoryStore {
    async fn claim_seat(
        &self,
        route_id: Uuid,
        seat_index: usize,
        user_id: Uuid,
    ) -> StoreResult<SeatMap> {
        let mut inner = self.inner.write().await;
        inner.guard_open()?;

        let entry = inner
            .routes
            .get_mut(&route_id)
            .ok_or(StoreError::RouteNotFound)?;

        entry.seats.claim(seat_index, user_id)?;
        let snapshot = entry.seats.clone();

        // El commit se difunde antes de resolver el acknowledgment
        let _ = entry.seats_tx.send(SeatEvent::Snapshot(snapshot.clone()));

        log::info!(
            "💺 Asiento {} de la ruta '{}' reclamado por {}",
            seat_index,
            entry.route.name,
            user_id
        );
        Ok(snapshot)
    }

    async fn seat_map(&self, route_id: Uuid) -> StoreResult<SeatMap> {
        let inner = self.inner.read().await;
        inner.guard_open()?;
        inner
            .routes
            .get(&route_id)
            .map(|entry| entry.seats.clone())
            .ok_or(StoreError::RouteNotFound)
    }

    async fn find_reservation(
        &self,
        route_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<usize>> {
        let inner = self.inner.read().await;
        inner.guard_open()?;
        inner
            .routes
            .get(&route_id)
            .map(|entry| entry.seats.seat_of(user_id))
            .ok_or(StoreError::RouteNotFound)
    }
}

#[async_trait]
impl LiveFeed for MemoryStore {
    async fn subscribe_routes(&self) -> StoreResult<RouteFeed> {
        // Candado de lectura: las mutaciones toman escritura, así que el
        // snapshot inicial y el receptor ven los mismos commits.
        let inner = self.inner.read().await;
        inner.guard_open()?;
        Ok(RouteFeed::new(inner.snapshot(), inner.routes_tx.subscribe()))
    }

    async fn subscribe_seats(&self, route_id: Uuid) -> StoreResult<SeatFeed> {
        let inner = self.inner.read().await;
        inner.guard_open()?;
        let entry = inner
            .routes
            .get(&route_id)
            .ok_or(StoreError::RouteNotFound)?;
        Ok(SeatFeed::new(entry.seats.clone(), entry.seats_tx.subscribe()))
    }
}
