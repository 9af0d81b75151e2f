//! Combined staleness verdict over a decoded credential bundle.

use chrono::{DateTime, Utc};
use sis_core::ValidationConfig;

use crate::credential::VerifiableCredentialJwt;
use crate::driving_licence::has_driving_licence_expired;
use crate::fraud_check::{has_fraud_check_expired, select_fraud_credential};

/// Outcome of the expiry evaluation over a credential bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryEvaluation {
    /// Whether the stored identity has gone stale.
    pub expired: bool,
    /// Issuance time of the fraud check credential that was evaluated, when
    /// one was found.
    pub fraud_check_issued_at: Option<i64>,
}

/// Evaluate both expiry gates. The driving licence gate only runs when it is
/// enabled and fully configured, and an inapplicable licence result never
/// expires the identity.
pub fn evaluate_identity_expiry(
    bundle: &[VerifiableCredentialJwt],
    config: &ValidationConfig,
    now: DateTime<Utc>,
) -> ExpiryEvaluation {
    let fraud_vc = select_fraud_credential(bundle, &config.fraud_issuers);
    let fraud_check_issued_at = fraud_vc.and_then(|vc| vc.nbf);
    let fraud_expired =
        has_fraud_check_expired(fraud_vc, config.fraud_validity_period_hours, now);

    let mut licence_expired = None;
    if config.driving_licence_enabled {
        if let (Some(issuers), Some(days)) = (
            config.dcmaw_issuers.as_deref(),
            config.driving_licence_validity_period_days,
        ) {
            licence_expired = has_driving_licence_expired(bundle, issuers, days, now);
        }
    }

    ExpiryEvaluation {
        expired: fraud_expired || licence_expired == Some(true),
        fraud_check_issued_at,
    }
}
