//! HTTP request handlers.
//!
//! This module contains all the HTTP endpoint handlers for the porttrack API.

use crate::error::{ErrorResponse, PortTrackError, Result};
use crate::server::response::{ServiceIdentity, ShipsResponse, HEALTH_BODY};
use crate::server::state::AppState;
use crate::store::{NewShip, Ship};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Health check handler.
///
/// GET /health
pub async fn health() -> &'static str {
    HEALTH_BODY
}

/// Service identity handler.
///
/// GET /
pub async fn identity(State(state): State<Arc<AppState>>) -> Json<ServiceIdentity> {
    Json(ServiceIdentity {
        service: state.service_name.clone(),
        env: state.env.clone(),
    })
}

/// List ships handler.
///
/// GET /ships
pub async fn list_ships(State(state): State<Arc<AppState>>) -> Result<Json<ShipsResponse>> {
    let ships = state.store.list().await?;
    info!(count = ships.len(), "list ships");
    Ok(Json(ShipsResponse { ships }))
}

/// Create ship handler.
///
/// POST /ships
///
/// The body is read raw so that a missing or malformed payload falls
/// through to the name check instead of being rejected by the extractor.
pub async fn create_ship(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Ship>)> {
    let created = match NewShip::from_body(&body) {
        Ok(draft) => state.store.create(draft).await,
        Err(err) => Err(err),
    };

    match created {
        Ok(ship) => {
            info!(id = ship.id, name = %ship.name, "ship created");
            Ok((StatusCode::CREATED, Json(ship)))
        }
        Err(err @ PortTrackError::Validation { .. }) => {
            warn!(error = %err, "ship rejected");
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// Fault injection handler for exercising alarms.
///
/// GET /error
pub async fn simulate_error() -> PortTrackError {
    error!("simulated error endpoint hit");
    PortTrackError::Simulated
}

/// Converts a handler panic into a 500 response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    error!(panic = detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal server error")),
    )
        .into_response()
}
