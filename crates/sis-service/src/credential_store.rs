//! Client for the encrypted credential store (EVCS).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::providers::{ConfigurationProvider, SecretsProvider};

/// State a stored item must be in to participate in validation.
pub const CURRENT_STATE: &str = "CURRENT";

#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("credential store rejected the access token as unauthorized")]
    Unauthorized,

    #[error("credential store reported the access token as forbidden")]
    Forbidden,

    #[error("no stored identity exists for this subject")]
    NotFound,

    #[error("credential store request failed: {0}")]
    Service(String),
}

/// One stored JWT with its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredItem {
    pub vc: String,
    pub state: String,
}

/// The store's identity response: the stored identity assertion plus the
/// credential bundle it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub si: StoredItem,
    #[serde(default)]
    pub vcs: Vec<StoredItem>,
}

/// Encoded credential JWTs in the bundle that are still current.
pub fn current_credentials(record: &IdentityRecord) -> Vec<String> {
    record
        .vcs
        .iter()
        .filter(|item| item.state == CURRENT_STATE)
        .map(|item| item.vc.clone())
        .collect()
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the stored identity for the subject of the bearer token. The
    /// full `Authorization` header value is forwarded as-is.
    async fn get_identity(
        &self,
        authorization: &str,
    ) -> Result<IdentityRecord, CredentialStoreError>;

    /// Invalidate the stored identity of a user.
    async fn invalidate_identity(&self, user_id: &str) -> Result<(), CredentialStoreError>;
}

#[derive(Debug, Clone, Deserialize)]
struct StoreErrorBody {
    message: Option<String>,
}

/// HTTP credential store client. Configuration and the service API key are
/// looked up per call so rotation takes effect without a restart.
pub struct HttpCredentialStore {
    client: reqwest::Client,
    config: Arc<dyn ConfigurationProvider>,
    secrets: Arc<dyn SecretsProvider>,
}

impl HttpCredentialStore {
    pub fn new(config: Arc<dyn ConfigurationProvider>, secrets: Arc<dyn SecretsProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            secrets,
        }
    }

    async fn request(
        &self,
        build: impl FnOnce(&reqwest::Client, &str) -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CredentialStoreError> {
        let config = self
            .config
            .configuration()
            .await
            .map_err(|err| CredentialStoreError::Service(err.to_string()))?;
        let api_key = self
            .secrets
            .service_api_key()
            .await
            .map_err(|err| CredentialStoreError::Service(err.to_string()))?;

        let mut request = build(&self.client, &config.evcs_api_url);
        if let Some(key) = api_key {
            request = request.header("x-api-key", key);
        }
        request
            .send()
            .await
            .map_err(|err| CredentialStoreError::Service(err.to_string()))
    }
}

#[async_trait]
impl CredentialStore for HttpCredentialStore {
    async fn get_identity(
        &self,
        authorization: &str,
    ) -> Result<IdentityRecord, CredentialStoreError> {
        let response = self
            .request(|client, base_url| {
                client
                    .get(format!("{base_url}/identity"))
                    .header("Authorization", authorization)
            })
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(CredentialStoreError::Unauthorized),
            StatusCode::FORBIDDEN => Err(CredentialStoreError::Forbidden),
            StatusCode::NOT_FOUND => Err(CredentialStoreError::NotFound),
            status if status.is_success() => response
                .json::<IdentityRecord>()
                .await
                .map_err(|err| CredentialStoreError::Service(err.to_string())),
            status => {
                let message = response
                    .json::<StoreErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| body.message)
                    .unwrap_or_default();
                Err(CredentialStoreError::Service(format!(
                    "status {status}: {message}"
                )))
            }
        }
    }

    async fn invalidate_identity(&self, user_id: &str) -> Result<(), CredentialStoreError> {
        let response = self
            .request(|client, base_url| {
                client
                    .post(format!("{base_url}/identity/invalidate"))
                    .json(&serde_json::json!({ "userId": user_id }))
            })
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CredentialStoreError::NotFound),
            status if status.is_success() => Ok(()),
            status => Err(CredentialStoreError::Service(format!("status {status}"))),
        }
    }
}
