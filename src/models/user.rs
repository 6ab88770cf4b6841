//! Modelo de usuario y claims de autenticación
//!
//! El núcleo de reservas solo consume el `user_id`; el rol decide qué
//! flujo habilita el cliente (conductores publican rutas, pasajeros
//! reclaman asientos).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Driver,
    Passenger,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Driver => "driver",
            UserRole::Passenger => "passenger",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "driver" => Some(UserRole::Driver),
            "passenger" => Some(UserRole::Passenger),
            _ => None,
        }
    }
}

/// Usuario del directorio de credenciales
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// Registro del directorio de credenciales (hash bcrypt, nunca la clave)
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Identidad resuelta tras validar credenciales o un token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

/// Claims del JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // user_id
    pub email: String,
    pub role: String,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::from_str("driver"), Some(UserRole::Driver));
        assert_eq!(UserRole::from_str("passenger"), Some(UserRole::Passenger));
        assert_eq!(UserRole::from_str("admin"), None);
        assert_eq!(UserRole::Driver.as_str(), "driver");
    }
}
