//! Verifiable credential handling for the stored identity service.
//!
//! Covers decoding of compact-JWT credential bundles, the stored identity
//! assertion, trust-level selection, fraud-check and driving-licence expiry
//! evaluation, and the credential-signature-set consistency check.

pub mod credential;
pub mod credential_set;
pub mod driving_licence;
pub mod error;
pub mod expiry;
pub mod fraud_check;
pub mod jwt;
pub mod stored_identity;

pub use credential::{
    CheckDetail, CredentialBody, CredentialKind, CredentialSubject, DrivingPermit, Evidence,
    FailedCheckDetail, FraudCheckType, VerifiableCredentialJwt,
};
pub use credential_set::validate_credential_set;
pub use driving_licence::has_driving_licence_expired;
pub use error::CredentialError;
pub use expiry::{evaluate_identity_expiry, ExpiryEvaluation};
pub use fraud_check::{has_fraud_check_expired, select_fraud_credential};
pub use stored_identity::{select_trust_level, StoredIdentityClaims};
