//! Application state management.
//!
//! This module manages the shared state across HTTP request handlers.

use crate::config::Config;
use crate::store::ShipStore;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    /// Ship store.
    pub store: Arc<dyn ShipStore>,
    /// Service name reported by `GET /`.
    pub service_name: String,
    /// Environment reported by `GET /`.
    pub env: String,
}

impl AppState {
    /// Creates a new application state from configuration and a store.
    pub fn new(config: &Config, store: Arc<dyn ShipStore>) -> Self {
        Self {
            store,
            service_name: config.service.name.clone(),
            env: config.service.env.clone(),
        }
    }
}
