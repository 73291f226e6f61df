//! Error types for visionguide

use thiserror::Error;

/// Result type alias using visionguide's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by [`Error::Unexpected`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Broad failure category, used by callers that only care about how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local setup is wrong; nothing was sent over the network
    Configuration,
    /// The remote service rejected the credential
    Authentication,
    /// Any other remote or transport failure
    Api,
    /// The call succeeded but carried no usable payload
    EmptyResult,
    /// Local processing failed
    Unexpected,
}

/// visionguide error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (E600-E699)
    #[error("OpenAI API Key is required.")]
    MissingApiKey,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Remote errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("OpenAI API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid OpenAI API Key. Please check your key. ({0})")]
    Authentication(String),

    #[error("{0}")]
    EmptyResult(String),

    // Local errors
    #[error("An unexpected error occurred: {0}")]
    Unexpected(#[source] BoxError),
}

impl Error {
    /// Wrap a local failure, keeping it as the error source
    pub fn unexpected(cause: impl Into<BoxError>) -> Self {
        Self::Unexpected(cause.into())
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingApiKey | Self::InvalidInput(_) => ErrorKind::Configuration,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::NetworkError(_) | Self::Api { .. } => ErrorKind::Api,
            Self::EmptyResult(_) => ErrorKind::EmptyResult,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NetworkError(_) => "E100",
            Self::Api { .. } => "E101",
            Self::Authentication(_) => "E102",
            Self::EmptyResult(_) => "E103",
            Self::MissingApiKey => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Unexpected(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MissingApiKey => Some("export OPENAI_API_KEY=<your key>".to_string()),
            Self::Authentication(_) => {
                Some("Check the key at https://platform.openai.com/api-keys".to_string())
            }
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::Api { status: 429, .. } => Some("Wait a moment and run again".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_configuration() {
        let error = Error::MissingApiKey;
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert_eq!(error.code(), "E600");
        assert_eq!(error.to_string(), "OpenAI API Key is required.");
        assert!(error.suggestion().unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_api_error_keeps_remote_message() {
        let error = Error::Api {
            status: 429,
            message: "Rate limit reached for images per minute".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::Api);
        assert_eq!(error.code(), "E101");
        assert!(error.to_string().contains("429"));
        assert!(error.to_string().contains("Rate limit reached for images per minute"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_authentication_message_is_actionable() {
        let error = Error::Authentication("Incorrect API key provided".to_string());
        assert_eq!(error.kind(), ErrorKind::Authentication);
        assert!(error.to_string().starts_with("Invalid OpenAI API Key. Please check your key."));
        assert!(error.to_string().contains("Incorrect API key provided"));
    }

    #[test]
    fn test_empty_result_is_its_own_kind() {
        let error = Error::EmptyResult("OpenAI API did not return image data.".to_string());
        assert_eq!(error.kind(), ErrorKind::EmptyResult);
        assert_eq!(error.to_string(), "OpenAI API did not return image data.");
        assert_eq!(error.suggestion(), None);
    }

    #[test]
    fn test_unexpected_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = Error::unexpected(io);
        assert_eq!(error.kind(), ErrorKind::Unexpected);
        assert_eq!(error.to_string(), "An unexpected error occurred: disk on fire");

        let source = std::error::Error::source(&error).expect("source retained");
        assert_eq!(source.to_string(), "disk on fire");
    }
}
