//! Contratos del almacén en vivo
//!
//! El Route Registry, el Reservation Ledger y el Live View Synchronizer se
//! expresan como traits inyectados explícitamente en cada componente (nunca
//! como estado global), de modo que los tests sustituyen la implementación
//! sin tocar a los consumidores. `memory::MemoryStore` implementa los tres.
//!
//! Contrato de suscripción: la primera entrega llega de inmediato con el
//! snapshot actual; las siguientes llegan en orden de commit; el borrado de
//! una ruta produce una notificación terminal `Unavailable` en su feed de
//! asientos; cancelar la suscripción es idempotente y libera el canal.

pub mod memory;
pub mod persist;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::route::{Route, RoutePoint};
use crate::models::seat::{SeatError, SeatMap};

/// Errores del registry y del ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("route not found")]
    RouteNotFound,

    #[error("a route named '{0}' already exists")]
    DuplicateName(String),

    #[error("seat {index} is already occupied")]
    SeatOccupied { index: usize },

    #[error("seat {index} is out of range (0..{count})")]
    SeatOutOfRange { index: usize, count: usize },

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("store unavailable")]
    Unavailable,
}

impl From<SeatError> for StoreError {
    fn from(err: SeatError) -> Self {
        match err {
            SeatError::Occupied { index } => StoreError::SeatOccupied { index },
            SeatError::OutOfRange { index, count } => StoreError::SeatOutOfRange { index, count },
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Datos para publicar una ruta nueva
#[derive(Debug, Clone)]
pub struct NewRoute {
    pub name: String,
    pub point: RoutePoint,
}

/// Registro de rutas publicadas por conductores
#[async_trait]
pub trait RouteRegistry: Send + Sync {
    /// Crea una ruta con identidad fresca y mapa de asientos libre.
    /// Falla con `DuplicateName` si el nombre ya está registrado.
    async fn create_route(&self, route: NewRoute) -> StoreResult<Route>;

    /// Borra la ruta y su mapa de asientos de forma atómica respecto a
    /// los observadores. Falla con `RouteNotFound` para ids desconocidos.
    async fn delete_route(&self, id: Uuid) -> StoreResult<()>;

    /// Snapshot actual en orden de creación.
    async fn list_routes(&self) -> StoreResult<Vec<Route>>;

    async fn get_route(&self, id: Uuid) -> StoreResult<Route>;
}

/// Ledger de ocupación de asientos, por ruta
#[async_trait]
pub trait ReservationLedger: Send + Sync {
    /// Escritura condicional: reclama el asiento solo si sigue libre en el
    /// momento del commit. La actualización se difunde a los suscriptores
    /// antes de resolver el acknowledgment.
    async fn claim_seat(&self, route_id: Uuid, seat_index: usize, user_id: Uuid)
        -> StoreResult<SeatMap>;

    /// Último snapshot conocido del mapa de asientos.
    async fn seat_map(&self, route_id: Uuid) -> StoreResult<SeatMap>;

    /// Asiento que un usuario tiene reservado en la ruta, si alguno.
    async fn find_reservation(&self, route_id: Uuid, user_id: Uuid)
        -> StoreResult<Option<usize>>;
}

/// Notificación de un feed de asientos
#[derive(Debug, Clone, PartialEq)]
pub enum SeatEvent {
    /// Snapshot completo del mapa tras un commit
    Snapshot(SeatMap),
    /// La ruta fue borrada; notificación terminal
    Unavailable,
}

/// Sincronizador de vistas en vivo
#[async_trait]
pub trait LiveFeed: Send + Sync {
    async fn subscribe_routes(&self) -> StoreResult<RouteFeed>;

    /// Falla con `RouteNotFound` si la ruta no existe al suscribirse.
    async fn subscribe_seats(&self, route_id: Uuid) -> StoreResult<SeatFeed>;
}

/// Suscripción a la lista de rutas. Cada entrega es la lista completa
/// vigente tras un commit del registry.
#[derive(Debug)]
pub struct RouteFeed {
    initial: Option<Vec<Route>>,
    rx: broadcast::Receiver<Vec<Route>>,
    closed: bool,
}

impl RouteFeed {
    pub(crate) fn new(initial: Vec<Route>, rx: broadcast::Receiver<Vec<Route>>) -> Self {
        Self {
            initial: Some(initial),
            rx,
            closed: false,
        }
    }

    /// Próxima entrega; `None` cuando la suscripción terminó.
    pub async fn recv(&mut self) -> Option<Vec<Route>> {
        if self.closed {
            return None;
        }
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.rx.recv().await {
                Ok(routes) => return Some(routes),
                // Un receptor rezagado salta al snapshot retenido más nuevo
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    self.closed = true;
                    return None;
                }
            }
        }
    }

    /// Cancela la suscripción. Seguro de llamar más de una vez.
    pub fn unsubscribe(&mut self) {
        self.closed = true;
        self.initial = None;
    }
}

/// Suscripción al mapa de asientos de una ruta
#[derive(Debug)]
pub struct SeatFeed {
    initial: Option<SeatMap>,
    rx: broadcast::Receiver<SeatEvent>,
    closed: bool,
}

impl SeatFeed {
    pub(crate) fn new(initial: SeatMap, rx: broadcast::Receiver<SeatEvent>) -> Self {
        Self {
            initial: Some(initial),
            rx,
            closed: false,
        }
    }

    /// Próxima entrega; tras `SeatEvent::Unavailable` el feed queda
    /// cerrado y devuelve `None`.
    pub async fn recv(&mut self) -> Option<SeatEvent> {
        if self.closed {
            return None;
        }
        if let Some(initial) = self.initial.take() {
            return Some(SeatEvent::Snapshot(initial));
        }
        loop {
            match self.rx.recv().await {
                Ok(SeatEvent::Unavailable) => {
                    self.closed = true;
                    return Some(SeatEvent::Unavailable);
                }
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    self.closed = true;
                    return None;
                }
            }
        }
    }

    /// Cancela la suscripción. Seguro de llamar más de una vez.
    pub fn unsubscribe(&mut self) {
        self.closed = true;
        self.initial = None;
    }
}
