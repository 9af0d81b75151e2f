/// Errors raised while decoding credential material.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid JWT: {0}")]
    InvalidJwt(String),

    #[error("missing claim: {0}")]
    MissingClaim(&'static str),
}
