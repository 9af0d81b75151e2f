use serde::{Deserialize, Serialize};

/// A hosted DID document, reduced to the fields key resolution reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidDocument {
    pub id: String,
    #[serde(rename = "assertionMethod", default)]
    pub assertion_method: Vec<AssertionMethod>,
}

/// An `assertionMethod` entry: either an embedded verification method or a
/// bare reference to one declared elsewhere in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssertionMethod {
    Embedded(VerificationMethod),
    Reference(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    pub public_key_jwk: PublicKeyJwk,
}

/// Public key material in JWK form. Only EC keys are used in practice; the
/// coordinate fields stay optional so a malformed key fails verification
/// rather than document parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyJwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}
