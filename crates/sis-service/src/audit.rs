//! Audit events in the TxMA envelope shape, published through a sink the
//! transport layer provides.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sis_core::TrustVector;

pub const STORED_IDENTITY_READ: &str = "SIS_STORED_IDENTITY_READ";
pub const STORED_IDENTITY_RETURNED: &str = "SIS_STORED_IDENTITY_RETURNED";
pub const IDENTITY_RECORD_INVALIDATED: &str = "SIS_IDENTITY_RECORD_INVALIDATED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditUser {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub govuk_signin_journey_id: Option<String>,
}

/// The event envelope. `extensions` and `restricted` carry per-event-kind
/// payloads, already serialized to JSON values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub component_id: String,
    pub event_name: String,
    pub event_timestamp_ms: i64,
    pub timestamp: i64,
    pub user: AuditUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted: Option<serde_json::Value>,
}

/// Extensions of the read event: how retrieval went, and what the record
/// could support.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "retrieval_outcome", rename_all = "snake_case")]
pub enum IdentityReadExtensions {
    Success {
        max_vot: TrustVector,
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp_fraud_check_iat: Option<i64>,
    },
    NoRecord,
    ServiceError,
}

/// Extensions of the returned event: what the caller was told.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "returned_outcome", rename_all = "snake_case")]
pub enum IdentityReturnedExtensions {
    Success {
        vot: TrustVector,
        is_valid: bool,
        expired: bool,
    },
    Error {
        error_code: String,
    },
}

/// Destination for audit events. Publication is fire-and-forget; delivery
/// guarantees belong to the queue transport behind the implementation.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn publish(&self, event: AuditEvent);
}

/// Default sink: emits events on the audit log target, for deployments where
/// the queue forwarder tails structured logs.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn publish(&self, event: AuditEvent) {
        match serde_json::to_string(&event) {
            Ok(body) => tracing::info!(target: "audit", event = %body, "audit event"),
            Err(err) => tracing::error!(error = %err, "failed to serialize audit event"),
        }
    }
}

/// Test sink that records every published event.
#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit sink poisoned").clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn publish(&self, event: AuditEvent) {
        self.events.lock().expect("audit sink poisoned").push(event);
    }
}

/// Builds and publishes the service's audit events.
pub struct Auditor {
    sink: std::sync::Arc<dyn AuditSink>,
    component_id: String,
}

impl Auditor {
    pub fn new(sink: std::sync::Arc<dyn AuditSink>) -> Self {
        Self::with_component_id(sink, "SIS")
    }

    pub fn with_component_id(
        sink: std::sync::Arc<dyn AuditSink>,
        component_id: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            component_id: component_id.into(),
        }
    }

    fn event(&self, event_name: &str, user: AuditUser) -> AuditEvent {
        let now = Utc::now();
        AuditEvent {
            component_id: self.component_id.clone(),
            event_name: event_name.to_string(),
            event_timestamp_ms: now.timestamp_millis(),
            timestamp: now.timestamp(),
            user,
            extensions: None,
            restricted: None,
        }
    }

    pub async fn identity_record_read(
        &self,
        extensions: IdentityReadExtensions,
        stored_identity_jwt: Option<String>,
        user: AuditUser,
    ) {
        let mut event = self.event(STORED_IDENTITY_READ, user);
        event.extensions = serde_json::to_value(&extensions).ok();
        event.restricted =
            stored_identity_jwt.map(|jwt| serde_json::json!({ "stored_identity_jwt": jwt }));
        self.sink.publish(event).await;
    }

    pub async fn identity_record_returned(
        &self,
        extensions: IdentityReturnedExtensions,
        response_body: Option<String>,
        user: AuditUser,
    ) {
        let mut event = self.event(STORED_IDENTITY_RETURNED, user);
        event.extensions = serde_json::to_value(&extensions).ok();
        event.restricted = response_body.map(|body| serde_json::json!({ "response_body": body }));
        self.sink.publish(event).await;
    }

    pub async fn identity_record_invalidated(&self, user_id: &str, intervention_code: &str) {
        let mut event = self.event(
            IDENTITY_RECORD_INVALIDATED,
            AuditUser {
                user_id: user_id.to_string(),
                govuk_signin_journey_id: None,
            },
        );
        event.extensions = Some(serde_json::json!({ "intervention_code": intervention_code }));
        self.sink.publish(event).await;
    }
}
