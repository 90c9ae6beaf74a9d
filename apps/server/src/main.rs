//! # Baraholka Server
//!
//! HTTP API for the neighborhood classifieds marketplace.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Baraholka Server                                 │
//! │                                                                         │
//! │  Client ───► axum (PORT) ───► routes ───► baraholka-core rules          │
//! │                                  │              │                       │
//! │                                  │              ▼                       │
//! │                                  └──────► baraholka-db ───► SQLite      │
//! │                                  │                                      │
//! │                                  └──────► Yandex Geocoder (proxied)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod geocode;
mod routes;
mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use baraholka_db::{Database, DbConfig};

use crate::config::ServerConfig;
use crate::geocode::GeocodeClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; absence is not an error
    let _ = dotenvy::dotenv();

    // Initialize tracing with EnvFilter; default to info for our crates
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "baraholka_server=info,baraholka_db=info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting Baraholka server...");

    // Load configuration
    let config = ServerConfig::from_env()?;
    info!(
        port = config.port,
        database = %config.database_path,
        geocoder = config.yandex_api_key.is_some(),
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    // A fresh installation gets the default category set
    db.categories().seed_defaults().await?;

    let geocoder = GeocodeClient::new(config.yandex_api_key.clone())?;
    let state = AppState::new(config.clone(), db, geocoder);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.socket_addr();
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.db().health_check().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
