//! Error types for nomi-api

use thiserror::Error;

/// Result type alias for remote API calls
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors raised while talking to the Nomi API
///
/// `Remote` and `Transport` render the same way: callers see one
/// `API Error: ...` message whether the service rejected the request or could
/// not be reached.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("API Error: {message}")]
    Remote { status: u16, message: String },

    /// The request could not be sent or the response could not be read
    #[error("API Error: {message}")]
    Transport { message: String },

    /// The configured base URL cannot carry path segments
    #[error("invalid base URL: {url}")]
    InvalidUrl { url: String },
}

impl ApiError {
    /// HTTP status of a remote rejection, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport {
            message: err.to_string(),
        }
    }
}
