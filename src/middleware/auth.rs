//! Extractor de identidad autenticada
//!
//! Lee el token Bearer del header Authorization, lo valida contra el
//! servicio de autenticación y entrega la identidad al handler. Los
//! handlers protegidos por rol usan los guards `require_driver` /
//! `require_passenger`.

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::models::user::{AuthenticatedUser, UserRole};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AuthUser(pub AuthenticatedUser);

impl AuthUser {
    pub fn require_driver(&self) -> Result<(), AppError> {
        self.require_role(UserRole::Driver, "Solo un conductor puede hacer esto")
    }

    pub fn require_passenger(&self) -> Result<(), AppError> {
        self.require_role(UserRole::Passenger, "Solo un pasajero puede hacer esto")
    }

    fn require_role(&self, role: UserRole, message: &str) -> Result<(), AppError> {
        if self.0.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(message.to_string()))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Malformed Authorization header".to_string()))?;

        let user = state.auth.validate_token(token)?;
        Ok(AuthUser(user))
    }
}
