//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. El registry, el ledger y el feed en vivo
//! viajan como trait objects inyectados: los tests sustituyen el almacén
//! sin tocar handlers ni controllers.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::services::auth_service::AuthService;
use crate::store::memory::MemoryStore;
use crate::store::{LiveFeed, ReservationLedger, RouteRegistry};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn RouteRegistry>,
    pub ledger: Arc<dyn ReservationLedger>,
    pub feed: Arc<dyn LiveFeed>,
    pub auth: Arc<AuthService>,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn RouteRegistry>,
        ledger: Arc<dyn ReservationLedger>,
        feed: Arc<dyn LiveFeed>,
        auth: Arc<AuthService>,
        config: EnvironmentConfig,
    ) -> Self {
        Self {
            registry,
            ledger,
            feed,
            auth,
            config,
        }
    }

    /// Estado respaldado por un único almacén en memoria, que implementa
    /// los tres contratos
    pub fn with_store(store: Arc<MemoryStore>, auth: Arc<AuthService>, config: EnvironmentConfig) -> Self {
        Self {
            registry: store.clone(),
            ledger: store.clone(),
            feed: store,
            auth,
            config,
        }
    }
}
