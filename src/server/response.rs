//! API response bodies.

use serde::{Deserialize, Serialize};

use crate::store::Ship;

/// Body of the liveness probe.
pub const HEALTH_BODY: &str = "OK";

/// Ship list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipsResponse {
    /// Every ship in insertion order.
    pub ships: Vec<Ship>,
}

/// Service identity response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    /// Service name.
    pub service: String,
    /// Deployment environment.
    pub env: String,
}
