use serde::{Deserialize, Serialize};

/// Validation configuration, delivered by the remote configuration store as
/// a JSON document. Field names follow the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Base URL of the credential store (EVCS).
    pub evcs_api_url: String,

    /// Intervention codes that invalidate a stored identity when seen on the
    /// intervention queue.
    #[serde(default)]
    pub intervention_codes_to_invalidate: Vec<String>,

    /// Issuers whose credentials count as fraud checks.
    pub fraud_issuers: Vec<String>,

    /// How long a fraud check stays current, in hours.
    pub fraud_validity_period_hours: i64,

    /// Controllers whose DID documents may vouch for stored identity keys.
    #[serde(default)]
    pub controller_allow_list: Vec<String>,

    /// Whether the driving licence expiry check runs at all.
    #[serde(default)]
    pub driving_licence_enabled: bool,

    /// Issuers whose credentials count as DCMAW document checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dcmaw_issuers: Option<Vec<String>>,

    /// How long a DCMAW check of an already-expired licence stays current,
    /// in whole days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driving_licence_validity_period_days: Option<i64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            evcs_api_url: "http://localhost:9090".into(),
            intervention_codes_to_invalidate: Vec::new(),
            fraud_issuers: Vec::new(),
            fraud_validity_period_hours: 4320,
            controller_allow_list: Vec::new(),
            driving_licence_enabled: false,
            dcmaw_issuers: None,
            driving_licence_validity_period_days: None,
        }
    }
}
