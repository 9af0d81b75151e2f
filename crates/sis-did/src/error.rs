/// Key resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum DidError {
    #[error("invalid did:web key identifier: {0}")]
    InvalidKeyIdentifier(String),

    #[error("cannot resolve kid to a JWK: {0}")]
    UnresolvableKid(String),

    #[error("assertion method as string reference is not supported: {0}")]
    UnsupportedReference(String),

    #[error("failed to fetch DID document for {controller}: {reason}")]
    DocumentFetch { controller: String, reason: String },

    #[error("malformed DID document: {0}")]
    MalformedDocument(String),
}
