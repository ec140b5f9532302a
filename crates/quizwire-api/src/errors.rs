//! API error types.

use quizwire_auth::AuthError;

/// Errors from the authenticated request pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server returned a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body.
        message: String,
    },

    /// The refresh credential was rejected; the user must log in again.
    #[error("session expired")]
    SessionExpired,

    /// Operation requires a logged-in user.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Auth-layer failure.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display() {
        let err = ApiError::Http {
            status: 404,
            message: "Quiz not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: Quiz not found");
    }

    #[test]
    fn session_expired_display() {
        assert_eq!(ApiError::SessionExpired.to_string(), "session expired");
    }

    #[test]
    fn auth_error_passthrough() {
        let err: ApiError = AuthError::Server {
            status: 401,
            message: "bad credentials".to_string(),
        }
        .into();
        assert!(err.to_string().contains("bad credentials"));
    }
}
