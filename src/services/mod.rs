//! Servicios del sistema
//!
//! Colaboradores externos al núcleo de reservas: autenticación (directorio
//! de credenciales + JWT), proveedor de localización y el flujo de
//! publicación de rutas del conductor.

pub mod auth_service;
pub mod jwt_service;
pub mod location_service;
pub mod route_publisher;
