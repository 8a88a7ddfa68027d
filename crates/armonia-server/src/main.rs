use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use armonia_api::{routes, AppState};
use armonia_core::services::LogMailer;
use armonia_infrastructure::database::{connection, PUBLIC_MIGRATOR};
use armonia_infrastructure::TenantRouter;
use armonia_security::JwtService;
use armonia_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    armonia_shared::telemetry::init_telemetry();

    info!("Armonia server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to the shared (public) schema and bring it up to date
    let base_pool =
        connection::create_pool(&config.database.url, config.database.max_connections).await?;
    PUBLIC_MIGRATOR.run(&base_pool).await?;
    info!("Database connection established.");

    // Tenant router owns every per-tenant pool
    let tenants = Arc::new(TenantRouter::new(
        base_pool.clone(),
        config.database.url.clone(),
        config.database.tenant_max_connections,
    ));

    let state = AppState::new(
        config.clone(),
        Arc::new(JwtService::new(&config.jwt)),
        tenants.clone(),
        Arc::new(LogMailer),
    );

    // Build router
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin("http://localhost:5173".parse::<axum::http::HeaderValue>()?)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true),
        );

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server; on SIGINT/SIGTERM every cached tenant pool is closed
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing tenant pools...");
    tenants.close_all().await;
    base_pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
