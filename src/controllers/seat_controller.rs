use std::sync::Arc;

use uuid::Uuid;

use crate::dto::seat_dto::{ReservationResponse, SeatMapResponse};
use crate::dto::ApiResponse;
use crate::models::seat::SEAT_COUNT;
use crate::models::user::AuthenticatedUser;
use crate::store::ReservationLedger;
use crate::utils::errors::AppError;

pub struct SeatController {
    ledger: Arc<dyn ReservationLedger>,
}

impl SeatController {
    pub fn new(ledger: Arc<dyn ReservationLedger>) -> Self {
        Self { ledger }
    }

    pub async fn seat_map(&self, route_id: Uuid) -> Result<SeatMapResponse, AppError> {
        let map = self.ledger.seat_map(route_id).await?;
        Ok(SeatMapResponse::new(route_id, &map))
    }

    pub async fn claim(
        &self,
        route_id: Uuid,
        seat_index: usize,
        user: &AuthenticatedUser,
    ) -> Result<ApiResponse<SeatMapResponse>, AppError> {
        if seat_index >= SEAT_COUNT {
            return Err(AppError::SeatOutOfRange(format!(
                "El asiento {} no existe (0..{})",
                seat_index, SEAT_COUNT
            )));
        }

        // Escritura condicional en el ledger: si otro pasajero llegó
        // primero, esto devuelve SeatOccupied y el estado no cambia
        let map = self.ledger.claim_seat(route_id, seat_index, user.id).await?;

        Ok(ApiResponse::success_with_message(
            SeatMapResponse::new(route_id, &map),
            format!("Asiento {} reservado exitosamente", seat_index),
        ))
    }

    pub async fn my_reservation(
        &self,
        route_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<ReservationResponse, AppError> {
        let seat_index = self.ledger.find_reservation(route_id, user.id).await?;
        Ok(ReservationResponse {
            route_id: route_id.to_string(),
            seat_index,
        })
    }
}
