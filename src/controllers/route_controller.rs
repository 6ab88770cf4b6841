use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::route_dto::{CreateRouteRequest, RouteListResponse, RouteResponse};
use crate::dto::ApiResponse;
use crate::models::route::RoutePoint;
use crate::store::{NewRoute, RouteRegistry};
use crate::utils::errors::AppError;

pub struct RouteController {
    registry: Arc<dyn RouteRegistry>,
}

impl RouteController {
    pub fn new(registry: Arc<dyn RouteRegistry>) -> Self {
        Self { registry }
    }

    pub async fn create(
        &self,
        request: CreateRouteRequest,
    ) -> Result<ApiResponse<RouteResponse>, AppError> {
        request.validate()?;

        // Validar campos
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "El nombre de la ruta es requerido".to_string(),
            ));
        }

        let point = RoutePoint::new(request.latitude, request.longitude);
        if !point.is_valid() {
            return Err(AppError::BadRequest(format!(
                "Coordenadas fuera de rango: ({}, {})",
                request.latitude, request.longitude
            )));
        }

        // El registry rechaza nombres duplicados con DuplicateName
        let route = self.registry.create_route(NewRoute { name, point }).await?;

        Ok(ApiResponse::success_with_message(
            route.into(),
            "Ruta creada exitosamente".to_string(),
        ))
    }

    pub async fn list(&self) -> Result<RouteListResponse, AppError> {
        let routes = self.registry.list_routes().await?;
        Ok(RouteListResponse::new(routes))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<RouteResponse, AppError> {
        let route = self.registry.get_route(id).await?;
        Ok(route.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.registry.delete_route(id).await?;
        Ok(())
    }
}
