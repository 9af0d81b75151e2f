//! Compact-JWT helpers that work on the token structure without verifying
//! signatures. Signature verification lives with the key resolver.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

/// The protected header fields this service cares about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JwtHeader {
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
    #[serde(default)]
    pub kid: Option<String>,
}

/// Decode the payload of a compact JWT without verifying its signature.
pub fn decode_body<T: DeserializeOwned>(token: &str) -> Result<T, CredentialError> {
    decode_segment(token, 1)
}

/// Decode the protected header of a compact JWT.
pub fn decode_header(token: &str) -> Result<JwtHeader, CredentialError> {
    decode_segment(token, 0)
}

/// The signature segment of a compact JWT, or `None` if the token does not
/// have three segments or the signature is empty.
pub fn signature_part(token: &str) -> Option<&str> {
    let mut segments = token.split('.');
    let (first, second, third) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() || first.is_empty() || second.is_empty() || third.is_empty() {
        return None;
    }
    Some(third)
}

fn decode_segment<T: DeserializeOwned>(token: &str, index: usize) -> Result<T, CredentialError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(CredentialError::InvalidJwt(format!(
            "expected 3 segments, got {}",
            segments.len()
        )));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(segments[index])
        .map_err(|err| CredentialError::InvalidJwt(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| CredentialError::InvalidJwt(err.to_string()))
}
