//! Top-level client facade.
//!
//! Builds every piece of the stack once, around one shared cookie-enabled
//! HTTP client: the refresh cookie set at login is automatically presented
//! by both the auth endpoints and the request pipeline.

use std::sync::Arc;

use quizwire_auth::{AuthClient, CredentialStore, TokenRefreshCoordinator, shared_http_client};
use quizwire_realtime::{RealtimeChannel, RealtimeConfig, SessionIdentity};
use quizwire_settings::ClientConfig;

use crate::errors::ApiError;
use crate::pipeline::ApiClient;

/// Everything a quiz frontend needs: auth, REST, and realtime channels.
pub struct QuizClient {
    config: ClientConfig,
    coordinator: TokenRefreshCoordinator,
    auth: AuthClient,
    api: ApiClient,
}

impl QuizClient {
    /// Build a client from explicit configuration.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let http = shared_http_client()?;
        let coordinator = TokenRefreshCoordinator::new(http.clone(), &config.api_base_url, store);
        let auth = AuthClient::new(http.clone(), &config.api_base_url, coordinator.clone());
        let api = ApiClient::new(http, &config.api_base_url, coordinator.clone());
        Ok(Self {
            config,
            coordinator,
            auth,
            api,
        })
    }

    /// Build a client from defaults plus `QUIZWIRE_*` env overrides.
    pub fn from_env(store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        Self::new(ClientConfig::from_env(), store)
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Auth endpoints (login, register, logout).
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// Authenticated REST pipeline.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The shared token coordinator (credential state, auth events).
    pub fn coordinator(&self) -> &TokenRefreshCoordinator {
        &self.coordinator
    }

    /// A fresh, disconnected realtime channel using this client's
    /// reconnect policy.
    pub fn channel(&self) -> RealtimeChannel {
        RealtimeChannel::new(RealtimeConfig {
            ws_base_url: self.config.ws_base_url.clone(),
            reconnect_delay_ms: self.config.reconnect_delay_ms,
            max_reconnect_attempts: self.config.max_reconnect_attempts,
        })
    }

    /// A channel already connecting to `code` as the authenticated host.
    ///
    /// Fails with [`ApiError::NotAuthenticated`] when no access token is
    /// installed.
    pub fn host_channel(&self, code: &str) -> Result<RealtimeChannel, ApiError> {
        let identity = self.host_identity()?;
        let channel = self.channel();
        channel.connect(code, &identity);
        Ok(channel)
    }

    /// A channel already connecting to `code` as a named participant.
    pub fn participant_channel(&self, code: &str, name: &str) -> RealtimeChannel {
        let channel = self.channel();
        channel.connect(
            code,
            &SessionIdentity::Participant {
                name: name.to_string(),
            },
        );
        channel
    }

    /// Host identity carrying the current access token.
    pub fn host_identity(&self) -> Result<SessionIdentity, ApiError> {
        self.coordinator
            .access_token()
            .map(|token| SessionIdentity::Host { token })
            .ok_or(ApiError::NotAuthenticated)
    }

    /// Identity for joining a session: the host identity when logged in,
    /// otherwise an anonymous participant under `name`.
    pub fn session_identity(&self, name: &str) -> SessionIdentity {
        match self.host_identity() {
            Ok(identity) => identity,
            Err(_) => SessionIdentity::Participant {
                name: name.to_string(),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
