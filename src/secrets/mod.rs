//! Startup secret bootstrap.
//!
//! When a secret id is configured, the loader fetches the secret once,
//! parses it as a JSON object and logs the names of its keys. Values never
//! reach the log. Failures are logged and otherwise ignored.

mod aws;

pub use aws::AwsSecretsManager;

use crate::config::SecretsConfig;
use crate::error::{PortTrackError, Result};
use crate::logging::json_field;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{error, info};

/// Raw secret payload as returned by a source.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretPayload {
    /// Secret stored as text.
    Text(String),
    /// Secret stored as binary; expected to hold UTF-8 text.
    Binary(Vec<u8>),
}

impl SecretPayload {
    /// Returns the payload as text, decoding binary payloads as UTF-8.
    pub fn into_text(self) -> Result<String> {
        match self {
            SecretPayload::Text(text) => Ok(text),
            SecretPayload::Binary(bytes) => String::from_utf8(bytes).map_err(|e| {
                PortTrackError::secret_load_with_source("secret binary is not valid UTF-8", e)
            }),
        }
    }
}

// Payloads hold credentials; keep them out of debug output.
impl std::fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretPayload::Text(_) => f.write_str("SecretPayload::Text(<redacted>)"),
            SecretPayload::Binary(bytes) => {
                write!(f, "SecretPayload::Binary(<{} bytes redacted>)", bytes.len())
            }
        }
    }
}

/// Trait implemented by secret stores.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Returns the source name.
    fn name(&self) -> &'static str;

    /// Fetches the secret identified by `secret_id`.
    async fn fetch(&self, secret_id: &str) -> Result<SecretPayload>;
}

/// Parses `text` as a JSON object and returns its key names in document
/// order.
pub fn secret_keys(text: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| PortTrackError::secret_load(format!("secret is not valid JSON: {}", e)))?;

    match value {
        Value::Object(fields) => Ok(key_names(fields)),
        _ => Err(PortTrackError::secret_load("secret is not a JSON object")),
    }
}

fn key_names(fields: Map<String, Value>) -> Vec<String> {
    fields.into_iter().map(|(key, _)| key).collect()
}

/// Loads the configured secret once at startup.
pub struct SecretLoader {
    secret_id: Option<String>,
    source: Arc<dyn SecretSource>,
}

impl SecretLoader {
    /// Creates a loader backed by AWS Secrets Manager.
    pub fn from_config(config: &SecretsConfig) -> Self {
        Self::new(
            config.secret_id.clone(),
            Arc::new(AwsSecretsManager::new(config.region.clone())),
        )
    }

    /// Creates a loader for `secret_id` reading from `source`.
    pub fn new(secret_id: Option<String>, source: Arc<dyn SecretSource>) -> Self {
        Self { secret_id, source }
    }

    /// Loads and logs the secret if an id is configured.
    ///
    /// Returns the key names on success. Without an id the source is never
    /// contacted.
    pub async fn load_if_configured(&self) -> Option<Vec<String>> {
        let Some(secret_id) = self.secret_id.as_deref() else {
            info!("DB_SECRET_ARN not set, skipping Secrets Manager");
            return None;
        };

        match self.load(secret_id).await {
            Ok(keys) => {
                info!(keys = %json_field(&keys), "Loaded secret from Secrets Manager");
                Some(keys)
            }
            Err(e) => {
                error!(error = %e, source = self.source.name(), "Failed to load secret");
                None
            }
        }
    }

    async fn load(&self, secret_id: &str) -> Result<Vec<String>> {
        let payload = self.source.fetch(secret_id).await?;
        secret_keys(&payload.into_text()?)
    }

    /// Runs the load in a background task.
    ///
    /// The returned handle resolves once the load has finished; a panic in
    /// the load is logged rather than propagated. Aborting the handle also
    /// cancels the load.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let task = tokio::spawn(async move {
                self.load_if_configured().await;
            });
            let _cancel = AbortOnDrop(task.abort_handle());

            if let Err(e) = task.await {
                error!(error = %e, "Secret loader task aborted");
            }
        })
    }
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
