//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas. Cada fallo llega al
//! llamador como valor, con un `code` estable para que el cliente pueda
//! reaccionar distinto (p. ej. `SEAT_OCCUPIED` pide otro asiento,
//! `NOT_FOUND` pide otra ruta).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::auth_service::AuthError;
use crate::services::location_service::LocationError;
use crate::services::route_publisher::PublishError;
use crate::store::StoreError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate route name: {0}")]
    DuplicateName(String),

    #[error("Seat occupied: {0}")]
    SeatOccupied(String),

    #[error("Seat out of range: {0}")]
    SeatOutOfRange(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RouteNotFound => {
                AppError::NotFound("La ruta ya no está disponible".to_string())
            }
            StoreError::DuplicateName(name) => AppError::DuplicateName(format!(
                "Ya existe una ruta llamada '{}'",
                name
            )),
            StoreError::SeatOccupied { index } => AppError::SeatOccupied(format!(
                "El asiento {} ya está ocupado",
                index
            )),
            StoreError::SeatOutOfRange { index, count } => AppError::SeatOutOfRange(format!(
                "El asiento {} no existe (0..{})",
                index, count
            )),
            StoreError::Malformed(msg) => AppError::Malformed(msg),
            StoreError::Unavailable => {
                AppError::Unavailable("El almacén en vivo no está disponible".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound => AppError::UserNotFound,
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Token(msg) => AppError::Unauthorized(msg),
        }
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Location(LocationError::PermissionDenied) => AppError::PermissionDenied,
            PublishError::NoFix => {
                AppError::BadRequest("Localización no disponible para publicar la ruta".to_string())
            }
            PublishError::Store(store_err) => store_err.into(),
        }
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Validation(e) => {
                eprintln!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The provided data is invalid".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Bad Request", msg, "BAD_REQUEST"),
            ),

            AppError::Unauthorized(msg) => {
                eprintln!("Unauthorized access: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED"),
                )
            }

            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(
                    "Invalid Credentials",
                    "Email o contraseña inválidos".to_string(),
                    "INVALID_CREDENTIALS",
                ),
            ),

            AppError::UserNotFound => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(
                    "User Not Found",
                    "Usuario no encontrado".to_string(),
                    "USER_NOT_FOUND",
                ),
            ),

            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new("Forbidden", msg, "FORBIDDEN"),
            ),

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("Not Found", msg, "NOT_FOUND"),
            ),

            AppError::DuplicateName(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("Duplicate Name", msg, "DUPLICATE_NAME"),
            ),

            AppError::SeatOccupied(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("Seat Occupied", msg, "SEAT_OCCUPIED"),
            ),

            AppError::SeatOutOfRange(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Seat Out Of Range", msg, "SEAT_OUT_OF_RANGE"),
            ),

            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new(
                    "Permission Denied",
                    "Permiso de localización denegado".to_string(),
                    "PERMISSION_DENIED",
                ),
            ),

            AppError::Malformed(msg) => {
                eprintln!("Malformed record: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Malformed Record",
                        "A stored record failed validation".to_string(),
                        "MALFORMED_RECORD",
                    ),
                )
            }

            AppError::Unavailable(msg) => {
                eprintln!("Store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("Service Unavailable", msg, "STORE_UNAVAILABLE"),
                )
            }

            AppError::Internal(msg) => {
                eprintln!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "An unexpected error occurred".to_string(),
                        details: Some(json!({ "internal_error": msg })),
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores internos
pub fn internal_error(message: &str) -> AppError {
    AppError::Internal(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_occupied_and_not_found_stay_distinct() {
        // El cliente reacciona distinto: otro asiento vs. otra ruta
        let occupied: AppError = StoreError::SeatOccupied { index: 3 }.into();
        let missing: AppError = StoreError::RouteNotFound.into();

        assert!(matches!(occupied, AppError::SeatOccupied(_)));
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[test]
    fn test_auth_errors_stay_distinct() {
        assert!(matches!(
            AppError::from(AuthError::UserNotFound),
            AppError::UserNotFound
        ));
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::InvalidCredentials
        ));
    }
}
