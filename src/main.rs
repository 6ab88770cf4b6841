use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use vancontrol::config::environment::EnvironmentConfig;
use vancontrol::routes::create_app;
use vancontrol::services::auth_service::AuthService;
use vancontrol::services::jwt_service::JwtService;
use vancontrol::state::AppState;
use vancontrol::store::memory::MemoryStore;
use vancontrol::store::persist;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚐 VanControl - Coordinación de rutas y asientos");
    info!("=================================================");

    let config = EnvironmentConfig::default();

    // Levantar el almacén en vivo, con snapshot persistido si existe
    let (store, auth) = match bootstrap(&config).await {
        Ok(parts) => parts,
        Err(e) => {
            error!("❌ Error levantando el almacén: {}", e);
            return Err(anyhow::anyhow!("Error de almacén: {}", e));
        }
    };

    let app_state = AppState::with_store(store.clone(), auth.clone(), config.clone());
    let app = create_app(app_state);

    // Puerto del servidor
    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔑 Endpoints - Auth:");
    info!("   POST /api/auth/login - Login (email + contraseña)");
    info!("🗺️ Endpoints - Rutas:");
    info!("   POST /api/route - Publicar ruta (conductor)");
    info!("   GET  /api/route - Listar rutas");
    info!("   GET  /api/route/live - Lista de rutas en vivo (SSE)");
    info!("   GET  /api/route/:id - Obtener ruta");
    info!("   DELETE /api/route/:id - Eliminar ruta (conductor)");
    info!("💺 Endpoints - Asientos:");
    info!("   GET  /api/route/:id/seats - Mapa de asientos");
    info!("   GET  /api/route/:id/seats/live - Mapa de asientos en vivo (SSE)");
    info!("   GET  /api/route/:id/seats/mine - Reserva propia");
    info!("   POST /api/route/:id/seats/:index - Reservar asiento (pasajero)");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                anyhow::Error::from(e)
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    // Cerrar feeds y persistir el estado antes de salir
    store.close().await;
    if let Some(path) = &config.snapshot_path {
        let records = store.export_records().await;
        let users = auth.export_users().await;
        let snapshot = persist::PersistedState::encode(&records, &users);
        match persist::save(path, &snapshot).await {
            Ok(()) => info!("💾 Snapshot guardado en {}", path.display()),
            Err(e) => error!("❌ No se pudo guardar el snapshot: {}", e),
        }
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Construye el almacén y el directorio de usuarios, desde el snapshot
/// persistido cuando está configurado y existe.
async fn bootstrap(
    config: &EnvironmentConfig,
) -> Result<(Arc<MemoryStore>, Arc<AuthService>), vancontrol::store::StoreError> {
    let jwt_service = JwtService::new(config.jwt_secret.clone(), config.jwt_expiration_hours);

    if let Some(path) = &config.snapshot_path {
        if let Some(snapshot) = persist::load(path).await? {
            let (records, users) = snapshot.decode()?;
            info!(
                "📂 Snapshot cargado: {} rutas, {} usuarios",
                records.len(),
                users.len()
            );
            let store = Arc::new(MemoryStore::from_records(records));
            let auth = Arc::new(AuthService::with_users(jwt_service, users));
            if auth.is_empty().await {
                auth.seed_demo_users().await;
            }
            return Ok((store, auth));
        }
        info!("📂 Sin snapshot previo en {}; almacén vacío", path.display());
    }

    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(AuthService::new(jwt_service));
    auth.seed_demo_users().await;
    Ok((store, auth))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
