//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de
//! configuración. Todos los valores tienen defaults de desarrollo para
//! que el binario arranque sin un `.env`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub cors_origins: Vec<String>,
    /// Snapshot persistido del almacén; `None` desactiva la persistencia
    pub snapshot_path: Option<PathBuf>,
    // Intervalos mínimos del proveedor de localización
    pub location_time_interval: Duration,
    pub location_distance_interval_m: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(3000),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "vancontrol-dev-secret-change-in-production".to_string()),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(24),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            snapshot_path: env::var("SNAPSHOT_PATH").ok().map(PathBuf::from),
            location_time_interval: env::var("LOCATION_TIME_INTERVAL_MS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or_else(|| Duration::from_secs(5)),
            location_distance_interval_m: env::var("LOCATION_DISTANCE_INTERVAL_M")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(10.0),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
