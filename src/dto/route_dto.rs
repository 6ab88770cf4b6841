use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::route::Route;

/// Request para publicar una ruta nueva
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRouteRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,

    pub latitude: f64,
    pub longitude: f64,
}

/// Response de ruta para la API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Route> for RouteResponse {
    fn from(route: Route) -> Self {
        Self {
            id: route.id.to_string(),
            name: route.name,
            latitude: route.point.latitude,
            longitude: route.point.longitude,
            created_at: route.created_at,
        }
    }
}

/// Response para listados de rutas
#[derive(Debug, Serialize, Deserialize)]
pub struct RouteListResponse {
    pub routes: Vec<RouteResponse>,
    pub total: usize,
}

impl RouteListResponse {
    pub fn new(routes: Vec<Route>) -> Self {
        let routes: Vec<RouteResponse> = routes.into_iter().map(RouteResponse::from).collect();
        let total = routes.len();
        Self { routes, total }
    }
}
