//! AWS Secrets Manager source.

use super::{SecretPayload, SecretSource};
use crate::error::{PortTrackError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use tokio::sync::OnceCell;
use tracing::debug;

/// Secret source backed by AWS Secrets Manager.
///
/// The SDK client is built on the first fetch, so constructing the source
/// never touches the network or the credential chain.
pub struct AwsSecretsManager {
    region: Option<String>,
    client: OnceCell<Client>,
}

impl AwsSecretsManager {
    /// Creates a source for `region`, or the SDK's default region when `None`.
    pub fn new(region: Option<String>) -> Self {
        Self {
            region,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                let mut loader = aws_config::defaults(BehaviorVersion::latest());
                if let Some(region) = &self.region {
                    loader = loader.region(Region::new(region.clone()));
                }
                Client::new(&loader.load().await)
            })
            .await
    }
}

#[async_trait]
impl SecretSource for AwsSecretsManager {
    fn name(&self) -> &'static str {
        "aws-secrets-manager"
    }

    async fn fetch(&self, secret_id: &str) -> Result<SecretPayload> {
        debug!(secret_id, region = ?self.region, "Fetching secret");

        let output = self
            .client()
            .await
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                PortTrackError::secret_load(format!(
                    "GetSecretValue failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        if let Some(text) = output.secret_string() {
            return Ok(SecretPayload::Text(text.to_string()));
        }

        if let Some(blob) = output.secret_binary() {
            return Ok(SecretPayload::Binary(blob.as_ref().to_vec()));
        }

        Err(PortTrackError::secret_load(
            "secret has neither SecretString nor SecretBinary",
        ))
    }
}
