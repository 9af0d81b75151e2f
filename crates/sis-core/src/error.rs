/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid trust vector label: {0}")]
    InvalidTrustVector(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}
