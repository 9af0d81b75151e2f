//! Stored identity validation service.
//!
//! Orchestrates the validation of reused identity assertions: bearer-token
//! authentication, credential-store retrieval, expiry and consistency
//! evaluation, DID-based signature verification, trust-level selection,
//! response assembly, and audit emission.

pub mod api;
pub mod audit;
pub mod config;
pub mod credential_store;
pub mod error;
pub mod intervention;
pub mod pipeline;
pub mod providers;

pub use audit::{AuditSink, Auditor, RecordingAuditSink, TracingAuditSink};
pub use credential_store::{CredentialStore, CredentialStoreError, HttpCredentialStore};
pub use error::ErrorCode;
pub use pipeline::{PipelineOutcome, UserIdentityRequest, UserIdentityResponse, ValidationPipeline};
pub use providers::{ConfigurationProvider, SecretsProvider};
