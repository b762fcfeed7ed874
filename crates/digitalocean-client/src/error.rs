//! DigitalOcean client errors

use thiserror::Error;

/// Errors that can occur when interacting with the DigitalOcean API
#[derive(Debug, Error)]
pub enum DigitalOceanError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// DigitalOcean API returned an error
    #[error("DigitalOcean API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Another action on the resource is still in progress (HTTP 422)
    #[error("Action pending: {0}")]
    Pending(String),

    /// Invalid request (e.g., missing required fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DigitalOceanError {
    /// True when the API refused the request because the resource is busy.
    pub fn is_pending(&self) -> bool {
        matches!(self, DigitalOceanError::Pending(_))
    }
}
