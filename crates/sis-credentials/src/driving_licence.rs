//! Driving licence staleness: a DCMAW document check performed against an
//! already-expired licence only vouches for the identity for a limited
//! number of days.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::credential::VerifiableCredentialJwt;

/// Pick the DCMAW driving-permit credential out of a bundle: issued by one
/// of the DCMAW issuers, an identity check, carrying a non-empty driving
/// permit claim, and recording a successful document check.
pub fn select_dcmaw_credential<'a>(
    bundle: &'a [VerifiableCredentialJwt],
    dcmaw_issuers: &[String],
) -> Option<&'a VerifiableCredentialJwt> {
    let candidates: Vec<&VerifiableCredentialJwt> = bundle
        .iter()
        .filter(|vc| {
            vc.iss
                .as_deref()
                .is_some_and(|iss| dcmaw_issuers.iter().any(|issuer| issuer == iss))
                && vc.is_identity_check()
                && has_driving_permit(vc)
                && has_successful_check(vc)
        })
        .collect();

    if candidates.len() > 1 {
        tracing::warn!("multiple DCMAW credentials found in bundle, using the first");
    }
    candidates.first().copied()
}

pub fn has_driving_permit(vc: &VerifiableCredentialJwt) -> bool {
    vc.vc
        .credential_subject
        .as_ref()
        .is_some_and(|subject| !subject.driving_permit.is_empty())
}

// A check counts as successful when every evidence entry was scored and at
// least one check detail records a biometric verification level above zero.
fn has_successful_check(vc: &VerifiableCredentialJwt) -> bool {
    let evidence = &vc.vc.evidence;
    !evidence.is_empty()
        && evidence
            .iter()
            .all(|entry| entry.strength_score.is_some() && entry.validity_score.is_some())
        && evidence
            .iter()
            .flat_map(|entry| &entry.check_details)
            .any(|detail| detail.biometric_verification_process_level.unwrap_or(0) > 0)
}

/// Whether the licence was already expired on the day the document check was
/// performed. Both sides compare at UTC start of day.
pub fn was_licence_expired_at_issuance(vc: &VerifiableCredentialJwt) -> bool {
    let permits = match vc.vc.credential_subject.as_ref() {
        Some(subject) if !subject.driving_permit.is_empty() => &subject.driving_permit,
        _ => return false,
    };

    if permits.len() > 1 {
        tracing::warn!("multiple driving permits found in DCMAW credential, using the first");
    }
    let permit = &permits[0];

    let (Some(expiry_date), Some(nbf)) = (permit.expiry_date.as_deref(), vc.nbf) else {
        tracing::warn!("missing expiry date or issuance time in driving permit credential");
        return false;
    };
    let Ok(licence_expiry_day) = NaiveDate::parse_from_str(expiry_date, "%Y-%m-%d") else {
        tracing::warn!(expiry_date, "unparseable driving permit expiry date");
        return false;
    };
    let Some(issued_at) = DateTime::from_timestamp(nbf, 0) else {
        return false;
    };

    licence_expiry_day < issued_at.date_naive()
}

/// Whether the driving licence gate marks the identity expired. `None` means
/// the bundle carries no qualifying DCMAW driving-permit credential and the
/// gate does not apply.
pub fn has_driving_licence_expired(
    bundle: &[VerifiableCredentialJwt],
    dcmaw_issuers: &[String],
    validity_period_days: i64,
    now: DateTime<Utc>,
) -> Option<bool> {
    let vc = select_dcmaw_credential(bundle, dcmaw_issuers)?;

    let Some(nbf) = vc.nbf else {
        tracing::warn!("DCMAW credential missing issuance time");
        return Some(false);
    };

    // A licence that was valid when the check ran never re-ages the check.
    if !was_licence_expired_at_issuance(vc) {
        return Some(false);
    }

    Some(has_nbf_expired_days(nbf, validity_period_days, now))
}

pub(crate) fn has_nbf_expired_days(nbf: i64, validity_period_days: i64, now: DateTime<Utc>) -> bool {
    let Some(issued_at) = DateTime::from_timestamp(nbf, 0) else {
        return true;
    };
    let start_of_day = issued_at
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc();
    start_of_day + Duration::days(validity_period_days) <= now
}
