use serde::{Deserialize, Serialize};

/// Decoded payload of a verifiable credential JWT from the credential store.
///
/// The store returns one of three credential shapes, distinguished by the
/// `vc.type` list; fields that only some shapes carry are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifiableCredentialJwt {
    #[serde(default)]
    pub iss: Option<String>,
    /// Issuance time as Unix seconds.
    #[serde(default)]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub vc: CredentialBody,
}

/// The `vc` claim of a credential JWT.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBody {
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<CredentialSubject>,
}

/// The credential shapes this service recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    IdentityCheck,
    RiskAssessment,
    SecurityCheck,
    Unknown,
}

impl VerifiableCredentialJwt {
    pub fn kind(&self) -> CredentialKind {
        let types = &self.vc.types;
        if types.iter().any(|t| t == "IdentityCheckCredential") {
            CredentialKind::IdentityCheck
        } else if types.iter().any(|t| t == "RiskAssessmentCredential") {
            CredentialKind::RiskAssessment
        } else if types.iter().any(|t| t == "SecurityCheckCredential") {
            CredentialKind::SecurityCheck
        } else {
            CredentialKind::Unknown
        }
    }

    pub fn is_identity_check(&self) -> bool {
        self.kind() == CredentialKind::IdentityCheck
    }
}

/// One evidence entry of an identity-check credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    #[serde(default)]
    pub check_details: Vec<CheckDetail>,
    #[serde(default)]
    pub failed_check_details: Vec<FailedCheckDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_score: Option<u32>,
}

impl Evidence {
    pub fn has_failed_check(&self, check: FraudCheckType) -> bool {
        self.failed_check_details
            .iter()
            .any(|detail| detail.fraud_check == Some(check))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometric_verification_process_level: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedCheckDetail {
    #[serde(default)]
    pub fraud_check: Option<FraudCheckType>,
}

/// Fraud check categories recorded on failed check details. Labels this
/// service does not know about decode to `Unknown` rather than failing the
/// whole credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudCheckType {
    ApplicableAuthoritativeSource,
    AvailableAuthoritativeSource,
    MortalityCheck,
    IdentityTheftCheck,
    SyntheticIdentityCheck,
    ImpersonationRiskCheck,
    Unknown,
}

impl FraudCheckType {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::ApplicableAuthoritativeSource => "applicable_authoritative_source",
            Self::AvailableAuthoritativeSource => "available_authoritative_source",
            Self::MortalityCheck => "mortality_check",
            Self::IdentityTheftCheck => "identity_theft_check",
            Self::SyntheticIdentityCheck => "synthetic_identity_check",
            Self::ImpersonationRiskCheck => "impersonation_risk_check",
            Self::Unknown => "unknown",
        }
    }

    fn from_label(label: &str) -> Self {
        match label {
            "applicable_authoritative_source" => Self::ApplicableAuthoritativeSource,
            "available_authoritative_source" => Self::AvailableAuthoritativeSource,
            "mortality_check" => Self::MortalityCheck,
            "identity_theft_check" => Self::IdentityTheftCheck,
            "synthetic_identity_check" => Self::SyntheticIdentityCheck,
            "impersonation_risk_check" => Self::ImpersonationRiskCheck,
            _ => Self::Unknown,
        }
    }
}

impl serde::Serialize for FraudCheckType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_label())
    }
}

impl<'de> serde::Deserialize<'de> for FraudCheckType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Subject claims of an identity-check credential. Only the document claims
/// the expiry evaluators read are modelled; the rest passes through ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub driving_permit: Vec<DrivingPermit>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivingPermit {
    /// Calendar date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<String>,
}
