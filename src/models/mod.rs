//! Modelos del sistema
//!
//! Registros tipados del núcleo. Los datos externos (snapshot persistido,
//! requests HTTP) se validan en la frontera antes de convertirse en estos
//! tipos.

pub mod route;
pub mod seat;
pub mod user;
