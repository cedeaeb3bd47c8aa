//! HTTP Server module - REST API server implementation.
//!
//! This module provides the HTTP server for porttrack, including
//! routing, request handling, and response formatting.

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod shutdown;
pub mod state;

#[cfg(test)]
mod handlers_tests;

use crate::config::Config;
use crate::error::{PortTrackError, Result};
use crate::secrets::SecretLoader;
use crate::store::{MemoryStore, ShipStore};
use axum::{routing::get, Router};
use state::AppState;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

/// Creates the API router with all endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::identity))
        .route("/health", get(handlers::health))
        .route(
            "/ships",
            get(handlers::list_ships).post(handlers::create_ship),
        )
        .route("/error", get(handlers::simulate_error));

    with_middleware(routes).with_state(state)
}

/// Wraps `routes` with panic recovery and the access log.
///
/// The access log is outermost so recovered panics are logged with their
/// 500 status.
pub(crate) fn with_middleware(routes: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    routes
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(axum::middleware::from_fn(middleware::access_log))
}

/// Starts the HTTP server with the seeded in-memory store.
///
/// Runs until SIGINT or SIGTERM.
pub async fn serve(config: &Config) -> Result<()> {
    let listener = bind(config).await?;
    serve_on(
        listener,
        config,
        Arc::new(MemoryStore::seeded()),
        SecretLoader::from_config(&config.secrets),
        shutdown::shutdown_signal(),
    )
    .await
}

/// Binds the configured address.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr = SocketAddr::new(
        config
            .server
            .bind
            .parse()
            .map_err(|e| PortTrackError::config_with_source("Invalid bind address", e))?,
        config.server.port,
    );

    TcpListener::bind(addr).await.map_err(|e| {
        PortTrackError::server_with_source(format!("Failed to bind to {}", addr), e)
    })
}

/// Serves requests on `listener` backed by `store` until `shutdown`
/// resolves.
///
/// The secret loader is started only once the listener is bound, so health
/// checks succeed while it runs. It is cancelled on shutdown if still
/// pending.
pub async fn serve_on<F>(
    listener: TcpListener,
    config: &Config,
    store: Arc<dyn ShipStore>,
    secrets: SecretLoader,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(store = store.name(), "Using ship store");
    let router = create_router(Arc::new(AppState::new(config, store)));

    let port = listener
        .local_addr()
        .map_err(|e| PortTrackError::server_with_source("Failed to read listener address", e))?
        .port();
    info!("Server listening on {}", port);

    let secret_task = secrets.spawn();

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await;

    secret_task.abort();
    served.map_err(|e| PortTrackError::server_with_source("Server error", e))?;

    info!("Server stopped");
    Ok(())
}
