use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Partner-facing error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    InvalidToken,
    Forbidden,
    NoRecord,
    ServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::InvalidToken => "invalid_token",
            Self::Forbidden => "forbidden",
            Self::NoRecord => "no_record",
            Self::ServerError => "server_error",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request from client",
            Self::InvalidToken => "Bearer token is missing or invalid",
            Self::Forbidden => "Access token expired or not permitted",
            Self::NoRecord => {
                "No Stored Identity exists for this user or Stored Identity has been invalidated"
            }
            Self::ServerError => "Unable to retrieve data",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NoRecord => StatusCode::NOT_FOUND,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_description: String,
}

impl From<ErrorCode> for ErrorResponse {
    fn from(code: ErrorCode) -> Self {
        Self {
            error: code.as_str().to_string(),
            error_description: code.description().to_string(),
        }
    }
}
