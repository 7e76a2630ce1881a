//! Error types for OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, unknown provider)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, invalid request)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// HTTP status of the failed response, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            OpenAIError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is transient and the same request may succeed later.
    ///
    /// Timeouts, conflicts, rate limits and server errors are retryable;
    /// every other API status, configuration and parse errors are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            OpenAIError::Network(_) => true,
            OpenAIError::Api { status, .. } => {
                matches!(*status, 408 | 409 | 429) || *status >= 500
            }
            OpenAIError::Config(_) | OpenAIError::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> OpenAIError {
        OpenAIError::Api {
            status,
            message: "boom".into(),
        }
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [408, 409, 429, 500, 502, 503] {
            assert!(api(status).is_retryable(), "{status} should retry");
        }
    }

    #[test]
    fn test_terminal_statuses() {
        for status in [400, 401, 403, 404, 422] {
            assert!(!api(status).is_retryable(), "{status} should not retry");
        }
        assert!(!OpenAIError::Config("no key".into()).is_retryable());
        assert!(!OpenAIError::Parse("bad json".into()).is_retryable());
    }

    #[test]
    fn test_network_errors_retry() {
        let err = OpenAIError::Network("connection reset".into());
        assert!(err.is_retryable());
        assert_eq!(err.status(), None);
    }
}
