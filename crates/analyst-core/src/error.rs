//! Error Types

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// LLM provider error types
#[derive(Error, Debug)]
pub enum LlmError {
    /// Provider answered with a non-success status
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unreachable (connection, DNS, TLS, timeout)
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered 2xx but the body lacks the expected structure
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limited or quota exhausted
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether the provider could not be reached or refused the call.
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::ProviderUnavailable(_) | Self::Auth(_) | Self::RateLimited(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(LlmError::ProviderUnavailable("refused".into()).is_unavailable());
        assert!(LlmError::Provider("HTTP 503".into()).is_unavailable());
        assert!(LlmError::Auth("HTTP 403".into()).is_unavailable());
        assert!(!LlmError::MalformedResponse("no candidates".into()).is_unavailable());
        assert!(!LlmError::Config("missing key".into()).is_unavailable());
    }
}
