//! Login, registration, and logout against the auth endpoints.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::credentials::UserProfile;
use crate::errors::AuthError;
use crate::refresh::{AuthEvent, TokenRefreshCoordinator};

/// Login endpoint success body.
///
/// The response also sets an httponly refresh cookie scoped to the refresh
/// endpoint; the shared client's cookie store retains it.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user: UserProfile,
}

/// Client for the `/auth` endpoints.
///
/// Shares the cookie-enabled HTTP client and the coordinator with the rest
/// of the stack, so a login immediately arms both the bearer token and the
/// refresh cookie.
pub struct AuthClient {
    http: reqwest::Client,
    api_base_url: String,
    coordinator: TokenRefreshCoordinator,
}

impl AuthClient {
    /// Create an auth client over the shared HTTP client.
    pub fn new(
        http: reqwest::Client,
        api_base_url: &str,
        coordinator: TokenRefreshCoordinator,
    ) -> Self {
        Self {
            http,
            api_base_url: api_base_url.to_string(),
            coordinator,
        }
    }

    /// Log in with username and password.
    ///
    /// On success the access token and user profile are installed into the
    /// coordinator and [`AuthEvent::LoggedIn`] is broadcast.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, AuthError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let resp = self
            .http
            .post(format!("{}/auth/login", self.api_base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let message = error_detail(resp).await;
            return Err(AuthError::Server { status, message });
        }

        let data: LoginResponse = resp.json().await?;
        self.coordinator
            .install(&data.access_token, data.user.clone())?;
        debug!(user_id = data.user.id, "logged in");
        Ok(data.user)
    }

    /// Register a new account, then log in with the same credentials.
    #[tracing::instrument(skip_all)]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });

        let resp = self
            .http
            .post(format!("{}/auth/register", self.api_base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let message = error_detail(resp).await;
            return Err(AuthError::Server { status, message });
        }

        self.login(username, password).await
    }

    /// Log out.
    ///
    /// Local credentials are always cleared and [`AuthEvent::LoggedOut`]
    /// broadcast, even when the server call fails. A dead server must not
    /// be able to pin stale credentials on this device.
    #[tracing::instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), AuthError> {
        let mut request = self
            .http
            .post(format!("{}/auth/logout", self.api_base_url));
        if let Some(token) = self.coordinator.access_token() {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!("server acknowledged logout");
            }
            Ok(resp) => {
                warn!(status = resp.status().as_u16(), "logout request rejected");
            }
            Err(e) => {
                warn!("logout request failed: {e}");
            }
        }

        self.coordinator.clear()?;
        self.coordinator.emit(AuthEvent::LoggedOut);
        Ok(())
    }
}

/// Pull a human-readable message out of an error response.
///
/// The backend puts its message in a `detail` field; fall back to the raw
/// body when it is absent.
async fn error_detail(resp: reqwest::Response) -> String {
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => value
            .get("detail")
            .and_then(|d| d.as_str())
            .map_or(text, ToString::to_string),
        Err(_) => text,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::store::MemoryCredentialStore;

    fn make_client(api_base: &str) -> (AuthClient, TokenRefreshCoordinator) {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap();
        let store = Arc::new(MemoryCredentialStore::new());
        let coordinator = TokenRefreshCoordinator::new(http.clone(), api_base, store);
        let client = AuthClient::new(http, api_base, coordinator.clone());
        (client, coordinator)
    }

    #[tokio::test]
    async fn login_installs_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_partial_json(serde_json::json!({"username": "host"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "user": {"id": 1, "username": "host"}
            })))
            .mount(&server)
            .await;

        let (client, coordinator) = make_client(&server.uri());
        let user = client.login("host", "secret").await.unwrap();

        assert_eq!(user.username, "host");
        assert_eq!(coordinator.access_token().as_deref(), Some("tok-1"));
        assert!(coordinator.is_authenticated());
    }

    #[tokio::test]
    async fn login_failure_surfaces_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "detail": "Incorrect username or password"
            })))
            .mount(&server)
            .await;

        let (client, coordinator) = make_client(&server.uri());
        let err = client.login("host", "wrong").await.unwrap_err();

        match err {
            AuthError::Server { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect username or password");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!coordinator.is_authenticated());
    }

    #[tokio::test]
    async fn register_then_auto_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 2, "username": "newbie"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-2",
                "user": {"id": 2, "username": "newbie"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, coordinator) = make_client(&server.uri());
        let user = client
            .register("newbie", "newbie@example.com", "secret")
            .await
            .unwrap();

        assert_eq!(user.id, 2);
        assert_eq!(coordinator.access_token().as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn register_conflict_does_not_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "detail": "Username already taken"
            })))
            .mount(&server)
            .await;

        let (client, coordinator) = make_client(&server.uri());
        let err = client
            .register("taken", "taken@example.com", "secret")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Server { status: 409, .. }));
        assert!(!coordinator.is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_even_when_server_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (client, coordinator) = make_client(&server.uri());
        coordinator
            .install(
                "tok-1",
                UserProfile {
                    id: 1,
                    username: "host".to_string(),
                },
            )
            .unwrap();
        let mut events = coordinator.subscribe();

        client.logout().await.unwrap();

        assert!(!coordinator.is_authenticated());
        assert!(coordinator.user().is_none());
        // LoggedOut follows whatever was already queued
        let mut saw_logged_out = false;
        while let Ok(event) = events.try_recv() {
            if event == AuthEvent::LoggedOut {
                saw_logged_out = true;
            }
        }
        assert!(saw_logged_out);
    }

    #[tokio::test]
    async fn logout_clears_when_server_unreachable() {
        let (client, coordinator) = make_client("http://127.0.0.1:9");
        coordinator
            .install(
                "tok-1",
                UserProfile {
                    id: 1,
                    username: "host".to_string(),
                },
            )
            .unwrap();

        client.logout().await.unwrap();
        assert!(!coordinator.is_authenticated());
    }
}
