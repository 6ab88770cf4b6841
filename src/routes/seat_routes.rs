use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::seat_controller::SeatController;
use crate::dto::seat_dto::{ReservationResponse, SeatMapResponse};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthUser;
use crate::routes::live_routes;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Router anidado bajo `/api/route/:id/seats`
pub fn create_seat_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_seat_map))
        .route("/live", get(live_routes::seats_live))
        .route("/mine", get(my_reservation))
        .route("/:index", post(claim_seat))
}

async fn get_seat_map(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let controller = SeatController::new(state.ledger.clone());
    let response = controller.seat_map(id).await?;
    Ok(Json(response))
}

async fn claim_seat(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<ApiResponse<SeatMapResponse>>, AppError> {
    user.require_passenger()?;
    let controller = SeatController::new(state.ledger.clone());
    let response = controller.claim(id, index, &user.0).await?;
    Ok(Json(response))
}

async fn my_reservation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let controller = SeatController::new(state.ledger.clone());
    let response = controller.my_reservation(id, &user.0).await?;
    Ok(Json(response))
}
