//! Colaborador de localización
//!
//! Contrato del proveedor de posición del dispositivo: un stream perezoso,
//! infinito y reiniciable de fixes que respeta un intervalo mínimo de
//! tiempo y de distancia, o `PermissionDenied` si el usuario no concede el
//! permiso. El registry consume un único fix cuando un conductor publica
//! una ruta; soltar el stream cancela el watch subyacente.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Fix de posición entregado por el proveedor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
}

impl PositionFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Distancia haversine en metros
    pub fn distance_m(&self, other: &PositionFix) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;

        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
}

/// Intervalos mínimos entre fixes entregados
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    pub time_interval: Duration,
    pub distance_interval_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        // Mismos intervalos que configura el cliente móvil
        Self {
            time_interval: Duration::from_secs(5),
            distance_interval_m: 10.0,
        }
    }
}

/// Stream de fixes; abortar la tarea productora al soltarlo garantiza que
/// ningún callback llegue después de cancelar.
#[derive(Debug)]
pub struct PositionStream {
    rx: mpsc::Receiver<PositionFix>,
    task: JoinHandle<()>,
}

impl PositionStream {
    pub async fn next(&mut self) -> Option<PositionFix> {
        self.rx.recv().await
    }

    /// Detiene el watch. Seguro de llamar más de una vez.
    pub fn cancel(&mut self) {
        self.task.abort();
        self.rx.close();
    }
}

impl Drop for PositionStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Inicia un watch nuevo. Cada llamada reinicia el stream desde el
    /// principio de la fuente.
    async fn watch_position(&self, options: WatchOptions) -> Result<PositionStream, LocationError>;
}

/// Proveedor determinista para tests y la herramienta de pruebas: recorre
/// un guion de fixes en ciclo, aplicando los mismos filtros de intervalo
/// que un dispositivo real.
pub struct SimulatedLocationProvider {
    granted: bool,
    script: Vec<PositionFix>,
}

impl SimulatedLocationProvider {
    pub fn granted(script: Vec<PositionFix>) -> Self {
        Self {
            granted: true,
            script,
        }
    }

    /// Simula al usuario rechazando el permiso de localización
    pub fn denied() -> Self {
        Self {
            granted: false,
            script: Vec::new(),
        }
    }
}

#[async_trait]
impl LocationProvider for SimulatedLocationProvider {
    async fn watch_position(&self, options: WatchOptions) -> Result<PositionStream, LocationError> {
        if !self.granted {
            return Err(LocationError::PermissionDenied);
        }

        let script = self.script.clone();
        let (tx, rx) = mpsc::channel(8);

        let task = tokio::spawn(async move {
            let mut last_emitted: Option<PositionFix> = None;
            let mut first = true;
            // Guion en ciclo: el stream es infinito mientras haya receptor.
            // El intervalo de tiempo corre entre candidatos, también para
            // los descartados por distancia.
            for fix in script.iter().copied().cycle() {
                if !first {
                    tokio::time::sleep(options.time_interval).await;
                }
                first = false;

                if let Some(last) = last_emitted {
                    if last.distance_m(&fix) < options.distance_interval_m {
                        continue;
                    }
                }
                if tx.send(fix).await.is_err() {
                    break;
                }
                last_emitted = Some(fix);
            }
        });

        Ok(PositionStream { rx, task })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_options() -> WatchOptions {
        WatchOptions {
            time_interval: Duration::from_millis(1),
            distance_interval_m: 10.0,
        }
    }

    #[tokio::test]
    async fn test_denied_permission_fails() {
        let provider = SimulatedLocationProvider::denied();
        let err = provider.watch_position(fast_options()).await.unwrap_err();
        assert_eq!(err, LocationError::PermissionDenied);
    }

    #[tokio::test]
    async fn test_first_fix_comes_from_script_start() {
        let provider = SimulatedLocationProvider::granted(vec![
            PositionFix::new(-23.5, -46.6),
            PositionFix::new(-23.6, -46.7),
        ]);

        let mut stream = provider.watch_position(fast_options()).await.unwrap();
        assert_eq!(stream.next().await, Some(PositionFix::new(-23.5, -46.6)));
        assert_eq!(stream.next().await, Some(PositionFix::new(-23.6, -46.7)));
    }

    #[tokio::test]
    async fn test_watch_restarts_from_script_start() {
        let provider = SimulatedLocationProvider::granted(vec![
            PositionFix::new(-23.5, -46.6),
            PositionFix::new(-23.6, -46.7),
        ]);

        let mut first = provider.watch_position(fast_options()).await.unwrap();
        assert_eq!(first.next().await, Some(PositionFix::new(-23.5, -46.6)));
        drop(first);

        let mut second = provider.watch_position(fast_options()).await.unwrap();
        assert_eq!(second.next().await, Some(PositionFix::new(-23.5, -46.6)));
    }

    #[tokio::test]
    async fn test_nearby_fixes_are_filtered_by_distance() {
        // El segundo punto está a menos de 10 m del primero; el tercero no
        let provider = SimulatedLocationProvider::granted(vec![
            PositionFix::new(-23.500000, -46.600000),
            PositionFix::new(-23.50000001, -46.60000001),
            PositionFix::new(-23.501, -46.601),
        ]);

        let mut stream = provider.watch_position(fast_options()).await.unwrap();
        assert_eq!(
            stream.next().await,
            Some(PositionFix::new(-23.500000, -46.600000))
        );
        assert_eq!(stream.next().await, Some(PositionFix::new(-23.501, -46.601)));
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery_and_is_idempotent() {
        let provider =
            SimulatedLocationProvider::granted(vec![PositionFix::new(-23.5, -46.6)]);

        let mut stream = provider.watch_position(fast_options()).await.unwrap();
        stream.cancel();
        stream.cancel();
        // Tras cancelar, el stream se agota en lugar de seguir entregando
        while stream.next().await.is_some() {}
    }

    #[test]
    fn test_haversine_sanity() {
        let a = PositionFix::new(-23.5, -46.6);
        assert!(a.distance_m(&a) < f64::EPSILON);

        // ~111 km por grado de latitud
        let b = PositionFix::new(-24.5, -46.6);
        let d = a.distance_m(&b);
        assert!((110_000.0..112_000.0).contains(&d), "got {}", d);
    }
}
