//! Error types for the Tag Manager client library
//!
//! Errors are grouped by where they arise: authentication, container
//! lookup, remote API rejections, transport, and client-side request
//! construction. Per-entity mutation failures during a batch are expected
//! to be logged and skipped by callers, not propagated.

use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Tag Manager client library
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, invalid, or expired credentials
    #[error("Authentication failed: {reason}")]
    Auth { reason: String },

    /// The named container does not exist in the account
    #[error("Container not found: {name}")]
    ContainerNotFound { name: String },

    /// The remote API rejected a request
    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },

    /// HTTP transport error
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Client-side request construction error
    #[error("Invalid request: {message}")]
    Validation { message: String },

    /// Local I/O error (credential cache, config)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an authentication error
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    /// Create a remote API error for the named operation
    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a client-side validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this error indicates missing or rejected credentials
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}
