//! Escenarios extremo a extremo del flujo de reservas
//!
//! Ejercitan el registry, el ledger y los feeds en vivo directamente
//! sobre el almacén, como los consumiría un cliente: publicar, observar,
//! reclamar y reaccionar a los conflictos.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use vancontrol::models::route::RoutePoint;
use vancontrol::models::seat::{SeatState, SEAT_COUNT};
use vancontrol::services::location_service::{
    PositionFix, SimulatedLocationProvider, WatchOptions,
};
use vancontrol::services::route_publisher::RoutePublisher;
use vancontrol::store::memory::MemoryStore;
use vancontrol::store::persist::PersistedState;
use vancontrol::store::{
    LiveFeed, NewRoute, ReservationLedger, RouteRegistry, SeatEvent, StoreError,
};

fn new_route(name: &str) -> NewRoute {
    NewRoute {
        name: name.to_string(),
        point: RoutePoint::new(-23.5, -46.6),
    }
}

fn fast_watch() -> WatchOptions {
    WatchOptions {
        time_interval: Duration::from_millis(1),
        distance_interval_m: 10.0,
    }
}

/// Escenario completo del pasajero: crear "Rota 1", observar el mapa,
/// reclamar el asiento 5 y ver fallar el reclamo tardío de otro usuario.
#[tokio::test]
async fn test_end_to_end_reservation_scenario() {
    let store = MemoryStore::new();

    let route = store.create_route(new_route("Rota 1")).await.unwrap();

    let listed = store.list_routes().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Rota 1");
    assert_eq!(listed[0].point, RoutePoint::new(-23.5, -46.6));

    // El pasajero se suscribe: el snapshot inicial llega de inmediato con
    // los 12 asientos libres
    let mut feed = store.subscribe_seats(route.id).await.unwrap();
    match feed.recv().await.unwrap() {
        SeatEvent::Snapshot(map) => {
            assert_eq!(map.len(), SEAT_COUNT);
            assert_eq!(map.occupied_count(), 0);
        }
        other => panic!("expected initial snapshot, got {:?}", other),
    }

    // u1 reclama el asiento 5
    let u1 = Uuid::new_v4();
    store.claim_seat(route.id, 5, u1).await.unwrap();

    match feed.recv().await.unwrap() {
        SeatEvent::Snapshot(map) => {
            assert_eq!(map.get(5), Some(SeatState::Occupied { occupant: u1 }));
            assert_eq!(map.occupied_count(), 1);
        }
        other => panic!("expected snapshot after claim, got {:?}", other),
    }

    // u2 llega tarde al mismo asiento: falla y el snapshot no cambia
    let u2 = Uuid::new_v4();
    let err = store.claim_seat(route.id, 5, u2).await.unwrap_err();
    assert_eq!(err, StoreError::SeatOccupied { index: 5 });

    let map = store.seat_map(route.id).await.unwrap();
    assert_eq!(map.get(5), Some(SeatState::Occupied { occupant: u1 }));
    assert_eq!(map.occupied_count(), 1);
}

#[tokio::test]
async fn test_duplicate_create_leaves_single_route() {
    let store = MemoryStore::new();

    store.create_route(new_route("Rota 2")).await.unwrap();
    let err = store.create_route(new_route("Rota 2")).await.unwrap_err();
    assert_eq!(err, StoreError::DuplicateName("Rota 2".to_string()));

    let names: Vec<String> = store
        .list_routes()
        .await
        .unwrap()
        .into_iter()
        .map(|route| route.name)
        .collect();
    assert_eq!(names, vec!["Rota 2"]);
}

/// Dos pasajeros que observaron el asiento libre lo reclaman a la vez:
/// la escritura condicional deja exactamente un ganador.
#[tokio::test]
async fn test_simultaneous_claims_one_winner() {
    let store = Arc::new(MemoryStore::new());
    let route = store.create_route(new_route("Rota 1")).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        let route_id = route.id;
        tasks.push(tokio::spawn(async move {
            store.claim_seat(route_id, 3, Uuid::new_v4()).await
        }));
    }

    let mut winners = 0;
    let mut occupied_losses = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(StoreError::SeatOccupied { index: 3 }) => occupied_losses += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(occupied_losses, 3);
}

/// Un observador de la lista de rutas ve cada commit en orden, y el
/// observador del mapa de una ruta borrada recibe su notificación
/// terminal.
#[tokio::test]
async fn test_observers_follow_commit_order_and_deletion() {
    let store = MemoryStore::new();

    let mut routes_feed = store.subscribe_routes().await.unwrap();
    assert!(routes_feed.recv().await.unwrap().is_empty());

    let first = store.create_route(new_route("Rota 1")).await.unwrap();
    let second = store.create_route(new_route("Rota 2")).await.unwrap();

    let mut seats_feed = store.subscribe_seats(first.id).await.unwrap();
    assert!(matches!(
        seats_feed.recv().await.unwrap(),
        SeatEvent::Snapshot(_)
    ));

    store.delete_route(first.id).await.unwrap();

    // La lista llega en orden de commit: [Rota 1], [Rota 1, Rota 2], [Rota 2]
    assert_eq!(
        routes_feed
            .recv()
            .await
            .unwrap()
            .iter()
            .map(|route| route.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Rota 1"]
    );
    assert_eq!(
        routes_feed
            .recv()
            .await
            .unwrap()
            .iter()
            .map(|route| route.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Rota 1", "Rota 2"]
    );
    assert_eq!(
        routes_feed
            .recv()
            .await
            .unwrap()
            .iter()
            .map(|route| route.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Rota 2"]
    );

    // El feed de asientos de la ruta borrada termina con Unavailable
    assert_eq!(seats_feed.recv().await.unwrap(), SeatEvent::Unavailable);
    assert_eq!(seats_feed.recv().await, None);

    // La otra ruta no se ve afectada
    assert!(store.seat_map(second.id).await.is_ok());
}

/// Flujo del conductor: publicar una ruta desde el fix actual del
/// proveedor de localización y verla aparecer en el feed de pasajeros.
#[tokio::test]
async fn test_driver_publishes_from_location_fix() {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(SimulatedLocationProvider::granted(vec![PositionFix::new(
        -23.5, -46.6,
    )]));
    let publisher = RoutePublisher::new(store.clone(), provider, fast_watch());

    let mut feed = store.subscribe_routes().await.unwrap();
    assert!(feed.recv().await.unwrap().is_empty());

    let route = publisher
        .publish_at_current_position("Rota 1".to_string())
        .await
        .unwrap();
    assert_eq!(route.point, RoutePoint::new(-23.5, -46.6));

    let update = feed.recv().await.unwrap();
    assert_eq!(update.len(), 1);
    assert_eq!(update[0].id, route.id);
}

/// El estado sobrevive un ciclo de apagado: exportar, persistir, cargar y
/// reconstruir el almacén con el mismo orden y la misma ocupación.
#[tokio::test]
async fn test_state_survives_snapshot_cycle() {
    let store = MemoryStore::new();
    let first = store.create_route(new_route("Rota 1")).await.unwrap();
    let second = store.create_route(new_route("Rota 2")).await.unwrap();

    let passenger = Uuid::new_v4();
    store.claim_seat(first.id, 7, passenger).await.unwrap();

    let records = store.export_records().await;
    let snapshot = PersistedState::encode(&records, &[]);

    // Por el cable JSON y de vuelta
    let raw = serde_json::to_string(&snapshot).unwrap();
    let reloaded: PersistedState = serde_json::from_str(&raw).unwrap();
    let (records, _) = reloaded.decode().unwrap();
    let restored = MemoryStore::from_records(records);

    let listed = restored.list_routes().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);

    let map = restored.seat_map(first.id).await.unwrap();
    assert_eq!(
        map.get(7),
        Some(SeatState::Occupied {
            occupant: passenger
        })
    );
    assert_eq!(restored.seat_map(second.id).await.unwrap().occupied_count(), 0);

    // Y el ledger restaurado sigue aplicando la escritura condicional
    let err = restored
        .claim_seat(first.id, 7, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::SeatOccupied { index: 7 });
}
