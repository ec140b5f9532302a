//! In-memory credential types.

use serde::{Deserialize, Serialize};

/// The authenticated user, as returned by the login endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-assigned user ID.
    pub id: i64,
    /// Unique username.
    pub username: String,
}

/// Current auth state: access token plus the user it belongs to.
///
/// The refresh credential is deliberately absent. It lives in an httponly
/// cookie managed by the HTTP client's cookie store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Short-lived bearer token, if logged in.
    pub access_token: Option<String>,
    /// Profile of the logged-in user.
    pub user: Option<UserProfile>,
}

impl Credentials {
    /// Whether an access token is present.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Storage key for the access token.
pub const KEY_ACCESS_TOKEN: &str = "access_token";

/// Storage key for the serialized user profile.
pub const KEY_USER: &str = "user";

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_not_authenticated() {
        let creds = Credentials::default();
        assert!(!creds.is_authenticated());
        assert!(creds.user.is_none());
    }

    #[test]
    fn token_means_authenticated() {
        let creds = Credentials {
            access_token: Some("tok".to_string()),
            user: None,
        };
        assert!(creds.is_authenticated());
    }

    #[test]
    fn user_profile_serde() {
        let user = UserProfile {
            id: 7,
            username: "quizmaster".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"id":7,"username":"quizmaster"}"#);
        let restored: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, user);
    }
}
