//! Error types for ML service operations.

use std::fmt;

/// Provider-agnostic error shared by every ML service implementation.
///
/// Implementations map their native failures onto these variants so callers
/// can decide between retrying later and giving up on a record.
#[derive(Debug)]
pub enum Error {
    /// API key rejected or missing permissions.
    Authentication(String),

    /// Connection failures, DNS errors, or 5xx responses that survived retries.
    Network(String),

    /// The request exceeded the configured timeout.
    Timeout(String),

    /// Provider rate limit still in effect after retries.
    RateLimited { retry_after_seconds: u64 },

    /// The provider answered but refused the request (4xx other than auth).
    Provider(String),

    /// Missing API key, malformed base URL, or similar set-up mistakes.
    Configuration(String),

    /// Response body did not match the expected contract.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether a later attempt at the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout(_) | Error::RateLimited { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
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

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_builder() {
            Error::Configuration(err.to_string())
        } else if err.is_decode() {
            Error::Deserialization(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            reqwest_middleware::Error::Middleware(err) => Error::Network(err.to_string()),
        }
    }
}
