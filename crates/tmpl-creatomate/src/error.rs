//! Creatomate client error types.

use thiserror::Error;

/// Result type for Creatomate operations.
pub type CreatomateResult<T> = Result<T, CreatomateError>;

/// Errors that can occur when talking to the rendering API.
#[derive(Debug, Error)]
pub enum CreatomateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        /// Delay requested by the server through `Retry-After`
        retry_after_ms: Option<u64>,
    },

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CreatomateError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>, retry_after_ms: Option<u64>) -> Self {
        Self::RateLimited {
            message: msg.into(),
            retry_after_ms,
        }
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status {
            401 | 403 => Self::Unauthorized(msg),
            404 => Self::NotFound(msg),
            429 => Self::rate_limited(msg, None),
            500..=599 => Self::ServerError(status, msg),
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, msg)),
        }
    }

    /// HTTP status this error was created from, if known.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::ServerError(status, _) => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CreatomateError::Network(_)
                | CreatomateError::RateLimited { .. }
                | CreatomateError::ServerError(_, _)
        )
    }

    /// Attach the server's `Retry-After` delay to a rate-limit error.
    pub fn with_retry_after(self, retry_after_ms: Option<u64>) -> Self {
        match self {
            Self::RateLimited { message, .. } => Self::RateLimited {
                message,
                retry_after_ms,
            },
            other => other,
        }
    }

    /// Delay the server asked for before the next attempt.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CreatomateError::NotFound(_))
    }
}
