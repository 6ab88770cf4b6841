use axum::{
    extract::{Path, State},
    routing::get,
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::route_controller::RouteController;
use crate::dto::route_dto::{CreateRouteRequest, RouteListResponse, RouteResponse};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthUser;
use crate::routes::live_routes;
use crate::routes::seat_routes;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_route_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_route).get(list_routes))
        .route("/live", get(live_routes::routes_live))
        .route("/:id", get(get_route).delete(delete_route))
        .nest("/:id/seats", seat_routes::create_seat_router())
}

async fn create_route(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateRouteRequest>,
) -> Result<Json<ApiResponse<RouteResponse>>, AppError> {
    user.require_driver()?;
    let controller = RouteController::new(state.registry.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_routes(
    State(state): State<AppState>,
) -> Result<Json<RouteListResponse>, AppError> {
    let controller = RouteController::new(state.registry.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RouteResponse>, AppError> {
    let controller = RouteController::new(state.registry.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn delete_route(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    user.require_driver()?;
    let controller = RouteController::new(state.registry.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Ruta eliminada exitosamente"
    })))
}
