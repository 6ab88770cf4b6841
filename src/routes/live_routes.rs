//! Feeds en vivo por Server-Sent Events
//!
//! Cada conexión SSE envuelve una suscripción del almacén: el primer
//! evento es el snapshot actual, los siguientes llegan en orden de
//! commit, y el borrado de la ruta emite un evento `unavailable` antes de
//! cerrar el stream. Cortar la conexión suelta el feed y con él la
//! suscripción subyacente.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use uuid::Uuid;

use crate::dto::route_dto::RouteListResponse;
use crate::dto::seat_dto::SeatMapResponse;
use crate::state::AppState;
use crate::store::SeatEvent;
use crate::utils::errors::AppError;

/// `GET /api/route/live` - lista de rutas en vivo
pub async fn routes_live(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let feed = state.feed.subscribe_routes().await?;

    let stream = stream::unfold(feed, |mut feed| async move {
        let routes = feed.recv().await?;
        let payload = RouteListResponse::new(routes);
        let event = Event::default().event("routes").json_data(&payload).ok()?;
        Some((Ok(event), feed))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// `GET /api/route/:id/seats/live` - mapa de asientos de una ruta en vivo
pub async fn seats_live(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let feed = state.feed.subscribe_seats(id).await?;

    let stream = stream::unfold((feed, id), |(mut feed, id)| async move {
        let event = match feed.recv().await? {
            SeatEvent::Snapshot(map) => Event::default()
                .event("seats")
                .json_data(&SeatMapResponse::new(id, &map))
                .ok()?,
            // Notificación terminal; el próximo recv devuelve None y el
            // stream SSE se cierra
            SeatEvent::Unavailable => Event::default().event("unavailable").data("route deleted"),
        };
        Some((Ok(event), (feed, id)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
