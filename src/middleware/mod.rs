//! Middleware del router
//!
//! CORS y extracción de la identidad autenticada.

pub mod auth;
pub mod cors;
