//! Provider error taxonomy.
//!
//! Errors are a tagged union so the fallback chain can dispatch retry
//! decisions off the tag: rate-limit and insufficient-credit failures move
//! on to the next configured model, auth and network failures stop the
//! chain immediately.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Authentication failed (HTTP 401/403). Retrying won't help.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Account balance exhausted (HTTP 402). The next model may bill differently.
    #[error("Insufficient credit: {message}")]
    InsufficientCredit { message: String },

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<u64>,
    },

    /// Invalid request parameters (HTTP 400).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Network or connection error. Retrying a different model won't help.
    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// Any other HTTP error status.
    #[error("Provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Anything else (malformed response body, exhausted fallback chain).
    #[error("{message}")]
    Other { message: String },
}

impl ProviderError {
    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an insufficient-credit error.
    pub fn insufficient_credit(message: impl Into<String>) -> Self {
        Self::InsufficientCredit {
            message: message.into(),
        }
    }

    /// Create a rate limit error.
    pub fn rate_limited(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimited {
            message: message.into(),
            retry_after,
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether the fallback chain should try the next configured model.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::InsufficientCredit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_tags() {
        assert!(ProviderError::rate_limited("slow down", Some(5)).is_retryable());
        assert!(ProviderError::insufficient_credit("top up").is_retryable());
    }

    #[test]
    fn test_non_retryable_tags() {
        assert!(!ProviderError::auth("bad key").is_retryable());
        assert!(!ProviderError::api(500, "oops").is_retryable());
        assert!(!ProviderError::invalid_request("bad params").is_retryable());
        assert!(!ProviderError::other("weird").is_retryable());
    }
}
