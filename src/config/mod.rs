//! Configuration module for porttrack.
//!
//! Configuration is assembled in layers: built-in defaults, an optional
//! YAML file, then environment variables. CLI flags are applied on top by
//! the entry point.

mod logging;
mod server;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use server::{
    SecretsConfig, ServerConfig, ServiceConfig, DEFAULT_ENV, DEFAULT_PORT, DEFAULT_SERVICE_NAME,
};

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::error::{PortTrackError, Result};

/// Configuration file used when present in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "porttrack.yaml";

/// Environment variable for configuration file path.
pub const ENV_CONFIG_PATH: &str = "PORTTRACK_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service identity.
    pub service: ServiceConfig,

    /// Server configuration.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Secrets Manager bootstrap.
    pub secrets: SecretsConfig,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// Priority for the file: explicit path, `PORTTRACK_CONFIG`, then
    /// `porttrack.yaml` in the working directory. Environment variables
    /// override whatever the file sets.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the process environment.
    pub fn load_with<F>(explicit_path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::resolve_config_path(explicit_path, &lookup)? {
            Some(path) => Self::load_from_path(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PortTrackError::config_with_source(
                format!("Failed to read config file: {}", path.display()),
                e,
            )
        })?;

        Self::load_from_str(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn load_from_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| PortTrackError::config_with_source("Failed to parse config", e))?;

        config.validate()?;
        Ok(config)
    }

    fn resolve_config_path<F>(explicit_path: Option<&Path>, lookup: &F) -> Result<Option<PathBuf>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let requested = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| non_empty(lookup(ENV_CONFIG_PATH)).map(PathBuf::from));

        if let Some(path) = requested {
            if !path.exists() {
                return Err(PortTrackError::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path));
        }

        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        Ok(default.exists().then_some(default))
    }

    /// Applies environment variable overrides.
    ///
    /// Empty values count as unset, so `ENV=""` still falls back to
    /// `NODE_ENV`.
    pub fn apply_env_overrides<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| non_empty(lookup(key));

        if let Some(name) = var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Some(env) = var("ENV").or_else(|| var("NODE_ENV")) {
            self.service.env = env;
        }

        if let Some(port) = var("PORT") {
            self.server.port = port.parse().map_err(|e| {
                PortTrackError::config_with_source(format!("Invalid PORT value: {}", port), e)
            })?;
        }

        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level.parse()?;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }

        if let Some(secret_id) = var("DB_SECRET_ARN") {
            self.secrets.secret_id = Some(secret_id);
        }
        if let Some(region) = var("AWS_REGION").or_else(|| var("AWS_DEFAULT_REGION")) {
            self.secrets.region = Some(region);
        }

        Ok(())
    }

    /// Validates configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PortTrackError::config("server.port must be > 0"));
        }

        if self.server.bind.parse::<IpAddr>().is_err() {
            return Err(PortTrackError::config(format!(
                "server.bind is not an IP address: {}",
                self.server.bind
            )));
        }

        if self.service.name.trim().is_empty() {
            return Err(PortTrackError::config("service.name must not be empty"));
        }

        if self.service.env.trim().is_empty() {
            return Err(PortTrackError::config("service.env must not be empty"));
        }

        if matches!(&self.secrets.secret_id, Some(id) if id.trim().is_empty()) {
            return Err(PortTrackError::config(
                "secrets.secret_id must not be empty when set",
            ));
        }

        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
