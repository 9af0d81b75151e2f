//! Fraud-check recency: a stored identity may only be reused while its most
//! recent fraud check is still current.

use chrono::{DateTime, Utc};

use crate::credential::{FraudCheckType, VerifiableCredentialJwt};

/// Pick the fraud check credential out of a bundle: issued by one of the
/// fraud issuers, carrying an issuance time, latest issuance wins. Ties keep
/// the later bundle entry.
pub fn select_fraud_credential<'a>(
    bundle: &'a [VerifiableCredentialJwt],
    fraud_issuers: &[String],
) -> Option<&'a VerifiableCredentialJwt> {
    let mut candidates: Vec<&VerifiableCredentialJwt> = bundle
        .iter()
        .filter(|vc| {
            vc.nbf.is_some()
                && vc
                    .iss
                    .as_deref()
                    .is_some_and(|iss| fraud_issuers.iter().any(|issuer| issuer == iss))
        })
        .collect();
    candidates.sort_by_key(|vc| vc.nbf);
    candidates.pop()
}

/// Whether the fraud check has expired. No fraud credential at all counts as
/// expired.
pub fn has_fraud_check_expired(
    fraud_vc: Option<&VerifiableCredentialJwt>,
    validity_period_hours: i64,
    now: DateTime<Utc>,
) -> bool {
    let Some(vc) = fraud_vc else {
        tracing::info!("no fraud check credential found in bundle of verifiable credentials");
        return true;
    };

    if vc.is_identity_check() {
        // A failed applicable-source check means no authoritative source can
        // ever cover this subject; the check never goes stale. A failed
        // available-source check is a hard fraud signal and expires the
        // identity outright.
        if has_failed_fraud_check(vc, FraudCheckType::ApplicableAuthoritativeSource) {
            return false;
        }
        if has_failed_fraud_check(vc, FraudCheckType::AvailableAuthoritativeSource) {
            return true;
        }
    }

    match vc.nbf {
        Some(nbf) => has_nbf_expired(nbf, validity_period_hours, now),
        None => true,
    }
}

fn has_failed_fraud_check(vc: &VerifiableCredentialJwt, check: FraudCheckType) -> bool {
    vc.vc
        .evidence
        .iter()
        .any(|evidence| evidence.has_failed_check(check))
}

pub(crate) fn has_nbf_expired(nbf: i64, validity_period_hours: i64, now: DateTime<Utc>) -> bool {
    let boundary = nbf + validity_period_hours * 3600;
    boundary <= now.timestamp()
}
