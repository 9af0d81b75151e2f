//! Configuration and secret retrieval seams. The deployed service reads a
//! remote configuration store and a secret manager; both are consumed here
//! through narrow traits with local implementations.

use async_trait::async_trait;
use std::path::PathBuf;

use sis_core::{CoreError, ValidationConfig};

#[async_trait]
pub trait ConfigurationProvider: Send + Sync {
    async fn configuration(&self) -> Result<ValidationConfig, CoreError>;
}

#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// API key for the credential store, when one is configured.
    async fn service_api_key(&self) -> Result<Option<String>, CoreError>;
}

/// Reads the validation configuration from a JSON document on disk, the same
/// document shape the remote configuration store serves.
pub struct FileConfigurationProvider {
    path: PathBuf,
}

impl FileConfigurationProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigurationProvider for FileConfigurationProvider {
    async fn configuration(&self) -> Result<ValidationConfig, CoreError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| {
                CoreError::Configuration(format!("{}: {err}", self.path.display()))
            })?;
        serde_json::from_str(&contents)
            .map_err(|err| CoreError::Configuration(format!("{}: {err}", self.path.display())))
    }
}

/// Fixed configuration, for tests and local development.
pub struct StaticConfigurationProvider(pub ValidationConfig);

#[async_trait]
impl ConfigurationProvider for StaticConfigurationProvider {
    async fn configuration(&self) -> Result<ValidationConfig, CoreError> {
        Ok(self.0.clone())
    }
}

/// Reads the service API key from an environment variable.
pub struct EnvSecretsProvider {
    variable: String,
}

impl EnvSecretsProvider {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl Default for EnvSecretsProvider {
    fn default() -> Self {
        Self::new("EVCS_API_KEY")
    }
}

#[async_trait]
impl SecretsProvider for EnvSecretsProvider {
    async fn service_api_key(&self) -> Result<Option<String>, CoreError> {
        Ok(std::env::var(&self.variable)
            .ok()
            .filter(|value| !value.is_empty()))
    }
}

/// Fixed secret, for tests.
pub struct StaticSecretsProvider(pub Option<String>);

#[async_trait]
impl SecretsProvider for StaticSecretsProvider {
    async fn service_api_key(&self) -> Result<Option<String>, CoreError> {
        Ok(self.0.clone())
    }
}
