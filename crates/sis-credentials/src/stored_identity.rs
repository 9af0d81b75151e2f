use serde::{Deserialize, Serialize};
use sis_core::TrustVector;

/// Decoded payload of the stored identity assertion JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIdentityClaims {
    pub sub: String,
    /// Trust level asserted by the credential store itself. Not covered by
    /// the assertion signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vot: Option<TrustVector>,
    /// Signed maximum attainable trust level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_vot: Option<TrustVector>,
    /// Trust mark URIs.
    #[serde(default)]
    pub vtm: Vec<String>,
    /// Signatures of the credentials this assertion was built from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<String>,
}

impl StoredIdentityClaims {
    /// The maximum trust level this assertion can support: the signed
    /// `max_vot` when present, otherwise the store's unsigned `vot`.
    pub fn max_trust_vector(&self) -> TrustVector {
        match self.max_vot {
            Some(vot) => vot,
            None => {
                tracing::warn!("max trust vector not in stored identity, using unsigned value");
                self.vot.unwrap_or(TrustVector::P0)
            }
        }
    }
}

/// Pick the usable trust level: the highest requested level that the stored
/// assertion can support, or `P0` when none qualifies.
pub fn select_trust_level(content: &StoredIdentityClaims, vtr: &[TrustVector]) -> TrustVector {
    let max = content.max_trust_vector();
    let mut requested = vtr.to_vec();
    requested.sort();
    requested
        .iter()
        .rev()
        .find(|level| **level <= max)
        .copied()
        .unwrap_or(TrustVector::P0)
}
