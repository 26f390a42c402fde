//! Error types for meeting AI operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common variants.
///
/// Provider implementations (chat completion, transcription, template stores) map
/// their native errors to these variants so that callers handle one error type
/// regardless of which vendor sits behind the trait.
#[derive(Debug)]
pub enum Error {
    /// API key rejected or lacking permissions. Not retryable without new credentials.
    Authentication(String),

    /// Network connectivity issues, DNS failures, or connection resets.
    Network(String),

    /// A required setting is missing or malformed (e.g. no model name configured).
    /// Fatal for the whole operation and never worth retrying.
    Configuration(String),

    /// The provider answered, but with an error status or an unusable payload.
    Provider(String),

    /// Operation exceeded the configured timeout.
    Timeout(String),

    /// Requested resource (prompt template, transcript) does not exist.
    NotFound(String),

    /// Provider rate limit exceeded.
    RateLimited { retry_after_seconds: u64 },

    /// Failed to deserialize a provider response into the expected shape.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(err.to_string()),
            _ => Error::Other(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn other_io_errors_keep_their_source() {
        let err: Error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, Error::Other(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn configuration_error_names_the_setting() {
        let err = Error::Configuration("OPENAI_MODEL is not set".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: OPENAI_MODEL is not set"
        );
    }
}
