//! Error types for the MCP server

use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving MCP requests
///
/// Every failure of a tool call ends up here and is rendered into an error
/// envelope by the dispatcher; none of these reach the host as a JSON-RPC
/// error except malformed protocol messages.
#[derive(Debug, Error)]
pub enum Error {
    /// The tool call carried no argument object
    #[error("No arguments provided")]
    MissingArguments,

    /// Arguments were present but unusable
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// The API credential is not available
    #[error("{message}")]
    Configuration { message: String },

    /// Unknown tool requested
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    /// Failure reported by the remote API client
    #[error(transparent)]
    Api(#[from] nomi_api::ApiError),

    /// The host cancelled the call before it completed
    #[error("Request cancelled{}", cancel_reason(.reason))]
    Cancelled { reason: Option<String> },

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn cancel_reason(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(": {}", reason),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_message_includes_reason() {
        let plain = Error::Cancelled { reason: None };
        assert_eq!(plain.to_string(), "Request cancelled");

        let with_reason = Error::Cancelled {
            reason: Some("user aborted".to_string()),
        };
        assert_eq!(with_reason.to_string(), "Request cancelled: user aborted");
    }

    #[test]
    fn api_errors_pass_through_verbatim() {
        let err = Error::from(nomi_api::ApiError::Remote {
            status: 400,
            message: "invalid_argument".to_string(),
        });
        assert_eq!(err.to_string(), "API Error: invalid_argument");
    }
}
