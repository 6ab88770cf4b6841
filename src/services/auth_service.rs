//! Servicio de autenticación
//!
//! Colaborador externo al núcleo de reservas: resuelve (email, clave) a
//! una identidad con rol y emite el token que los endpoints protegidos
//! consumen. El ledger solo ve el `user_id` resultante.

use std::collections::HashMap;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::user::{AuthenticatedUser, UserRecord, UserRole};
use crate::services::jwt_service::JwtService;

/// Errores del colaborador de autenticación
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("user not found")]
    UserNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token error: {0}")]
    Token(String),
}

/// Sesión emitida tras un login exitoso
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: AuthenticatedUser,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AuthService {
    jwt_service: JwtService,
    // Directorio de credenciales, indexado por email
    users: RwLock<HashMap<String, UserRecord>>,
}

impl AuthService {
    pub fn new(jwt_service: JwtService) -> Self {
        Self {
            jwt_service,
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Directorio cargado desde el snapshot persistido
    pub fn with_users(jwt_service: JwtService, records: Vec<UserRecord>) -> Self {
        let users = records
            .into_iter()
            .map(|record| (record.email.clone(), record))
            .collect();
        Self {
            jwt_service,
            users: RwLock::new(users),
        }
    }

    /// Usuarios de ejemplo para entornos sin snapshot: un conductor y dos
    /// pasajeros. Las claves solo existen en forma de hash.
    pub async fn seed_demo_users(&self) {
        let demo = [
            ("carlos@vancontrol.app", "motorista123", UserRole::Driver),
            ("ana@vancontrol.app", "passageira123", UserRole::Passenger),
            ("bruno@vancontrol.app", "passageiro123", UserRole::Passenger),
        ];

        let mut users = self.users.write().await;
        for (email, password, role) in demo {
            let password_hash = match hash(password, DEFAULT_COST) {
                Ok(hashed) => hashed,
                Err(err) => {
                    log::error!("❌ No se pudo hashear la clave demo de {}: {}", email, err);
                    continue;
                }
            };
            users.insert(
                email.to_string(),
                UserRecord {
                    id: Uuid::new_v4(),
                    email: email.to_string(),
                    password_hash,
                    role,
                },
            );
        }
        log::info!("👥 Directorio demo inicializado con {} usuarios", users.len());
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Autentica un usuario y emite su token de acceso
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let users = self.users.read().await;
        let record = users.get(email).ok_or(AuthError::UserNotFound)?;

        let valid = verify(password, &record.password_hash)
            .map_err(|err| AuthError::Token(format!("hash verification failed: {}", err)))?;
        if !valid {
            log::warn!("🔑 Credenciales inválidas para {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let user = AuthenticatedUser {
            id: record.id,
            email: record.email.clone(),
            role: record.role,
        };
        drop(users);

        let token = self
            .jwt_service
            .generate_access_token(&user)
            .map_err(AuthError::Token)?;
        let expires_at = Utc::now() + self.jwt_service.access_token_duration();

        log::info!("✅ Login de {} como {}", user.email, user.role.as_str());
        Ok(IssuedSession {
            user,
            token,
            expires_at,
        })
    }

    /// Valida un token y devuelve la identidad del usuario
    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.jwt_service.get_user(token).map_err(AuthError::Token)
    }

    /// Directorio completo para el snapshot de apagado
    pub async fn export_users(&self) -> Vec<UserRecord> {
        self.users.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth_service() -> AuthService {
        AuthService::new(JwtService::new("test-secret".to_string(), 24))
    }

    #[tokio::test]
    async fn test_demo_passenger_authentication() {
        let auth_service = test_auth_service();
        auth_service.seed_demo_users().await;

        let session = auth_service
            .authenticate("ana@vancontrol.app", "passageira123")
            .await
            .unwrap();
        assert_eq!(session.user.role, UserRole::Passenger);
        assert!(!session.token.is_empty());

        let decoded = auth_service.validate_token(&session.token).unwrap();
        assert_eq!(decoded, session.user);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let auth_service = test_auth_service();
        auth_service.seed_demo_users().await;

        let err = auth_service
            .authenticate("ana@vancontrol.app", "wrong_password")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_unknown_email_is_user_not_found() {
        let auth_service = test_auth_service();
        auth_service.seed_demo_users().await;

        let err = auth_service
            .authenticate("nadie@vancontrol.app", "whatever")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UserNotFound);
    }

    #[tokio::test]
    async fn test_directory_round_trips_through_export() {
        let auth_service = test_auth_service();
        auth_service.seed_demo_users().await;

        let exported = auth_service.export_users().await;
        assert_eq!(exported.len(), 3);

        let restored = AuthService::with_users(
            JwtService::new("test-secret".to_string(), 24),
            exported,
        );
        let session = restored
            .authenticate("carlos@vancontrol.app", "motorista123")
            .await
            .unwrap();
        assert_eq!(session.user.role, UserRole::Driver);
    }
}
