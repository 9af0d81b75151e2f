//! Consistency check between the signatures a stored identity assertion
//! declares and the credentials actually returned alongside it.

use std::collections::HashSet;

use crate::jwt;
use crate::stored_identity::StoredIdentityClaims;

/// Whether the signature set declared by the stored identity assertion
/// matches the signatures of the presented credential JWTs, ignoring order.
///
/// Presented tokens without an identifiable signature are dropped with a
/// warning before comparing. An assertion declaring no signatures is only
/// consistent with an empty presentation.
pub fn validate_credential_set(
    stored: &StoredIdentityClaims,
    presented_jwts: &[String],
) -> bool {
    let mut presented: Vec<&str> = Vec::with_capacity(presented_jwts.len());
    for token in presented_jwts {
        match jwt::signature_part(token) {
            Some(signature) => presented.push(signature),
            None => tracing::warn!(
                "could not identify the signature for a credential, ignoring it when comparing \
                 to the stored identity record"
            ),
        }
    }

    if stored.credentials.len() != presented.len() {
        tracing::error!(
            declared = stored.credentials.len(),
            presented = presented.len(),
            "signatures referenced in the stored identity record do not match the credentials returned"
        );
        return false;
    }

    let declared: HashSet<&str> = stored.credentials.iter().map(String::as_str).collect();
    let presented: HashSet<&str> = presented.into_iter().collect();
    let matches = declared == presented;
    if !matches {
        tracing::error!(
            "signatures referenced in the stored identity record do not match the credentials returned"
        );
    }
    matches
}
