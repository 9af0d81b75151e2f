//! Intervention message handling: an account intervention with a configured
//! code invalidates the user's stored identity.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::Auditor;
use crate::credential_store::{CredentialStore, CredentialStoreError};
use crate::providers::ConfigurationProvider;

/// A message from the intervention queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionMessage {
    pub user_id: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_code: Option<String>,
}

pub struct InterventionProcessor {
    config: Arc<dyn ConfigurationProvider>,
    store: Arc<dyn CredentialStore>,
    auditor: Auditor,
}

impl InterventionProcessor {
    pub fn new(
        config: Arc<dyn ConfigurationProvider>,
        store: Arc<dyn CredentialStore>,
        auditor: Auditor,
    ) -> Self {
        Self {
            config,
            store,
            auditor,
        }
    }

    /// Process a batch of raw queue messages. A message that does not parse
    /// fails the whole batch so the transport can redeliver it.
    pub async fn process_batch(&self, raw_messages: &[String]) -> anyhow::Result<()> {
        let messages = parse_messages(raw_messages)?;
        tracing::info!(count = messages.len(), "received intervention messages");

        let config = self.config.configuration().await?;

        for message in &messages {
            let code = message
                .intervention_code
                .as_deref()
                .filter(|code| !code.is_empty());
            let Some(code) = code else {
                tracing::info!("message does not contain an intervention code");
                continue;
            };
            if !config
                .intervention_codes_to_invalidate
                .iter()
                .any(|candidate| candidate == code)
            {
                tracing::info!("message does not contain a relevant intervention code");
                continue;
            }

            self.invalidate(&message.user_id, code).await?;
        }

        Ok(())
    }

    async fn invalidate(&self, user_id: &str, intervention_code: &str) -> anyhow::Result<()> {
        match self.store.invalidate_identity(user_id).await {
            Ok(()) => {
                tracing::info!("successfully invalidated user identity");
                self.auditor
                    .identity_record_invalidated(user_id, intervention_code)
                    .await;
                Ok(())
            }
            // An intervention for a user with no stored identity is routine.
            Err(CredentialStoreError::NotFound) => {
                tracing::info!("no stored identity exists for the intervened user");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "error calling service to invalidate user");
                Err(err.into())
            }
        }
    }
}

fn parse_messages(raw_messages: &[String]) -> anyhow::Result<Vec<InterventionMessage>> {
    raw_messages
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            serde_json::from_str(raw)
                .map_err(|err| anyhow::anyhow!("message {index} does not have required fields: {err}"))
        })
        .collect()
}
