//! Error types for the OpenAI-compatible adapter

use parley_application::GatewayError;
use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, OpenAiError>;

/// Errors that can occur when talking to an OpenAI-compatible endpoint
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request timeout")]
    Timeout,
}

impl From<OpenAiError> for GatewayError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::Timeout => GatewayError::Timeout,
            OpenAiError::Http(e) if e.is_timeout() => GatewayError::Timeout,
            OpenAiError::Http(e) if e.is_connect() => GatewayError::ConnectionError(e.to_string()),
            OpenAiError::Status { status, message } => match status {
                401 | 403 => GatewayError::Unauthorized(message),
                404 => GatewayError::ModelNotAvailable(message),
                _ => GatewayError::RequestFailed(format!("{}: {}", status, message)),
            },
            OpenAiError::ClientBuild(msg) => GatewayError::Other(msg),
            other => GatewayError::RequestFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unauthorized: GatewayError = OpenAiError::Status {
            status: 401,
            message: "Incorrect API key".into(),
        }
        .into();
        assert!(matches!(unauthorized, GatewayError::Unauthorized(m) if m == "Incorrect API key"));

        let missing: GatewayError = OpenAiError::Status {
            status: 404,
            message: "model not found".into(),
        }
        .into();
        assert!(matches!(missing, GatewayError::ModelNotAvailable(_)));

        let overloaded: GatewayError = OpenAiError::Status {
            status: 529,
            message: "overloaded".into(),
        }
        .into();
        assert_eq!(overloaded.to_string(), "Request failed: 529: overloaded");
    }

    #[test]
    fn test_timeout_mapping() {
        assert!(matches!(
            GatewayError::from(OpenAiError::Timeout),
            GatewayError::Timeout
        ));
    }
}
