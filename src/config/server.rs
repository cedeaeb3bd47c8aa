//! Server and service identity configuration types.

use serde::{Deserialize, Serialize};

/// Default service name reported in logs and by `GET /`.
pub const DEFAULT_SERVICE_NAME: &str = "porttrack-api";

/// Default environment name.
pub const DEFAULT_ENV: &str = "dev";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,

    /// Listen port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Identity stamped on every log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name.
    pub name: String,

    /// Deployment environment (dev, staging, prod, ...).
    pub env: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVICE_NAME.to_string(),
            env: DEFAULT_ENV.to_string(),
        }
    }
}

/// Secrets Manager bootstrap configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// ARN or name of the secret to load at startup.
    pub secret_id: Option<String>,

    /// Region for the Secrets Manager client.
    pub region: Option<String>,
}
