//! Publicación de rutas desde la posición del conductor
//!
//! Flujo del conductor: tomar un único fix del proveedor de localización y
//! registrar la ruta con ese punto. El watch se cancela al soltar el
//! stream, reclamado o no.

use std::sync::Arc;

use thiserror::Error;

use crate::models::route::{Route, RoutePoint};
use crate::services::location_service::{LocationError, LocationProvider, WatchOptions};
use crate::store::{NewRoute, RouteRegistry, StoreError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PublishError {
    #[error(transparent)]
    Location(#[from] LocationError),

    /// El watch terminó sin entregar ningún fix
    #[error("no position fix available")]
    NoFix,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct RoutePublisher {
    registry: Arc<dyn RouteRegistry>,
    location: Arc<dyn LocationProvider>,
    options: WatchOptions,
}

impl RoutePublisher {
    pub fn new(
        registry: Arc<dyn RouteRegistry>,
        location: Arc<dyn LocationProvider>,
        options: WatchOptions,
    ) -> Self {
        Self {
            registry,
            location,
            options,
        }
    }

    /// Publica una ruta anclada a la posición actual del conductor
    pub async fn publish_at_current_position(&self, name: String) -> Result<Route, PublishError> {
        let mut stream = self.location.watch_position(self.options).await?;
        let fix = stream.next().await.ok_or(PublishError::NoFix)?;
        drop(stream);

        let route = self
            .registry
            .create_route(NewRoute {
                name,
                point: RoutePoint::new(fix.latitude, fix.longitude),
            })
            .await?;
        Ok(route)
    }
}
