use anyhow::Context;
use axum::http::{header, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use session_api::{create_router, AppState};
use session_core::{SessionConfig, StoreKind};
use session_infrastructure::{build_manager, KeyValueClient, RedisClient};
use session_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize telemetry; the guard flushes file logs on drop
    let _log_guard = session_shared::telemetry::init_telemetry(&config.log)
        .context("failed to initialize telemetry")?;

    info!("{} starting ({})...", config.app.name, config.app.env);

    let session_config = SessionConfig::try_from(&config.session)
        .context("invalid session configuration")?;

    // Connect to Redis only when the remote store needs it
    let client: Option<Arc<dyn KeyValueClient>> = match (&config.redis.url, session_config.store) {
        (Some(url), StoreKind::Remote) => {
            info!("Connecting to Redis...");
            let client = RedisClient::connect(url, &config.redis)
                .await
                .context("failed to connect to redis")?;
            Some(Arc::new(client))
        }
        (Some(_), StoreKind::Memory) => {
            warn!("redis.url is set but the memory session store is selected; ignoring it");
            None
        }
        (None, _) => None,
    };

    let manager = Arc::new(
        build_manager(session_config, client).context("failed to initialize session store")?,
    );
    info!(
        "Session management {} ({} store)",
        if manager.config().enabled { "enabled" } else { "disabled" },
        manager.store().kind().as_str()
    );

    // Build router
    let app = create_router(AppState::new(manager.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        );

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse().context("invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Closing session store...");
    if let Err(e) = manager.close().await {
        error!("Failed to close session store: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("Initiating graceful shutdown...");
}
