//! Auth error types.

/// Errors that can occur during authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server rejected the request.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body.
        message: String,
    },

    /// Token refresh failed.
    #[error(transparent)]
    Refresh(#[from] RefreshError),
}

/// A failed token refresh.
///
/// Cloneable so a single refresh outcome can be fanned out to every caller
/// awaiting the shared in-flight future.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("token refresh failed ({}): {message}", .status.map_or_else(|| "network".to_string(), |s| s.to_string()))]
pub struct RefreshError {
    /// HTTP status code, if a response was received.
    pub status: Option<u16>,
    /// Error description.
    pub message: String,
}

impl RefreshError {
    /// A refresh failure with an HTTP status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// A refresh failure without a response (network error).
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
