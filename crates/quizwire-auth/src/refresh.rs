//! Token refresh coordination.
//!
//! A 401 anywhere in the request pipeline funnels into
//! [`TokenRefreshCoordinator::refresh`]. The first caller starts the HTTP
//! refresh; every caller that arrives while it is in flight awaits a clone
//! of the same shared future, so one expiry storm produces exactly one
//! refresh request.
//!
//! The refresh credential is an httponly cookie held by the HTTP client's
//! cookie store. The coordinator only ever sees access tokens.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::credentials::{Credentials, KEY_ACCESS_TOKEN, KEY_USER, UserProfile};
use crate::errors::{AuthError, RefreshError};
use crate::store::CredentialStore;

/// Capacity of the auth event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Auth lifecycle notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// Credentials were installed after a successful login.
    LoggedIn {
        /// The user that logged in.
        user: Option<UserProfile>,
    },
    /// Credentials were cleared by an explicit logout.
    LoggedOut,
    /// The refresh credential was rejected; the session is over.
    SessionExpired,
}

type SharedRefresh = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

/// Refresh endpoint success body.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

struct Inner {
    http: reqwest::Client,
    refresh_url: String,
    store: Arc<dyn CredentialStore>,
    credentials: Mutex<Credentials>,
    pending: Mutex<Option<SharedRefresh>>,
    events: broadcast::Sender<AuthEvent>,
}

/// Owns the in-memory credentials and the single-flight refresh slot.
///
/// Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct TokenRefreshCoordinator {
    inner: Arc<Inner>,
}

impl TokenRefreshCoordinator {
    /// Create a coordinator, hydrating credentials from the store.
    ///
    /// `http` must have its cookie store enabled so the refresh cookie set
    /// at login is presented to the refresh endpoint.
    pub fn new(
        http: reqwest::Client,
        api_base_url: &str,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let credentials = hydrate(store.as_ref());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                http,
                refresh_url: format!("{api_base_url}/auth/refresh"),
                store,
                credentials: Mutex::new(credentials),
                pending: Mutex::new(None),
                events,
            }),
        }
    }

    /// The current access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.inner.credentials.lock().access_token.clone()
    }

    /// The logged-in user, if any.
    pub fn user(&self) -> Option<UserProfile> {
        self.inner.credentials.lock().user.clone()
    }

    /// Whether an access token is present.
    pub fn is_authenticated(&self) -> bool {
        self.inner.credentials.lock().is_authenticated()
    }

    /// Subscribe to auth lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    /// Install freshly issued credentials (login success).
    pub fn install(&self, access_token: &str, user: UserProfile) -> Result<(), AuthError> {
        {
            let mut creds = self.inner.credentials.lock();
            creds.access_token = Some(access_token.to_string());
            creds.user = Some(user.clone());
        }
        self.inner.store.set(KEY_ACCESS_TOKEN, access_token)?;
        let user_json = serde_json::to_string(&user)?;
        self.inner.store.set(KEY_USER, &user_json)?;
        let _ = self.inner.events.send(AuthEvent::LoggedIn { user: Some(user) });
        Ok(())
    }

    /// Drop the access token ahead of a refresh, keeping the user.
    pub fn invalidate_access_token(&self) -> Result<(), AuthError> {
        self.inner.credentials.lock().access_token = None;
        self.inner.store.remove(KEY_ACCESS_TOKEN)?;
        Ok(())
    }

    /// Wipe all credentials from memory and the store.
    pub fn clear(&self) -> Result<(), AuthError> {
        *self.inner.credentials.lock() = Credentials::default();
        self.inner.store.remove(KEY_ACCESS_TOKEN)?;
        self.inner.store.remove(KEY_USER)?;
        Ok(())
    }

    /// Broadcast an auth event to subscribers.
    pub(crate) fn emit(&self, event: AuthEvent) {
        let _ = self.inner.events.send(event);
    }

    /// Treat the session as over: wipe credentials and broadcast
    /// [`AuthEvent::SessionExpired`].
    ///
    /// Store failures are logged rather than surfaced; the in-memory
    /// credentials are gone either way.
    pub fn expire_session(&self) {
        if let Err(e) = self.clear() {
            warn!("failed to clear credentials on expiry: {e}");
        }
        let _ = self.inner.events.send(AuthEvent::SessionExpired);
    }

    /// Obtain a fresh access token, deduplicating concurrent callers.
    ///
    /// Exactly one HTTP request is made per expiry no matter how many
    /// requests hit a 401 at once. On failure the credentials are cleared
    /// and [`AuthEvent::SessionExpired`] is broadcast before any caller
    /// observes the error.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let fut = {
            let mut pending = self.inner.pending.lock();
            if let Some(existing) = pending.as_ref() {
                debug!("joining in-flight token refresh");
                existing.clone()
            } else {
                let inner = Arc::clone(&self.inner);
                let fut: SharedRefresh = async move {
                    let result = perform_refresh(&inner).await;
                    // Clear the slot before anyone observes the outcome so
                    // the next refresh starts a new request.
                    *inner.pending.lock() = None;
                    result
                }
                .boxed()
                .shared();
                *pending = Some(fut.clone());
                fut
            }
        };
        fut.await
    }
}

/// Load persisted credentials at startup.
fn hydrate(store: &dyn CredentialStore) -> Credentials {
    let access_token = store.get(KEY_ACCESS_TOKEN);
    let user = store.get(KEY_USER).and_then(|json| {
        match serde_json::from_str::<UserProfile>(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("failed to parse stored user profile: {e}");
                None
            }
        }
    });
    Credentials { access_token, user }
}

/// The actual refresh request. Runs at most once per in-flight window.
async fn perform_refresh(inner: &Arc<Inner>) -> Result<String, RefreshError> {
    debug!(url = %inner.refresh_url, "refreshing access token");

    let resp = match inner.http.post(&inner.refresh_url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            let err = RefreshError::network(e.to_string());
            expire_session(inner, &err);
            return Err(err);
        }
    };

    let status = resp.status().as_u16();
    if !(200..300).contains(&status) {
        let text = resp.text().await.unwrap_or_default();
        let err = RefreshError::status(status, text);
        expire_session(inner, &err);
        return Err(err);
    }

    let data: RefreshResponse = match resp.json().await {
        Ok(data) => data,
        Err(e) => {
            let err = RefreshError::network(e.to_string());
            expire_session(inner, &err);
            return Err(err);
        }
    };

    inner.credentials.lock().access_token = Some(data.access_token.clone());
    if let Err(e) = inner.store.set(KEY_ACCESS_TOKEN, &data.access_token) {
        warn!("failed to persist refreshed access token: {e}");
    }
    debug!("access token refreshed");
    Ok(data.access_token)
}

/// Fatal refresh failure: wipe credentials and notify subscribers.
fn expire_session(inner: &Arc<Inner>, err: &RefreshError) {
    warn!("token refresh failed, clearing session: {err}");
    *inner.credentials.lock() = Credentials::default();
    if let Err(e) = inner.store.remove(KEY_ACCESS_TOKEN) {
        warn!("failed to clear stored access token: {e}");
    }
    if let Err(e) = inner.store.remove(KEY_USER) {
        warn!("failed to clear stored user: {e}");
    }
    let _ = inner.events.send(AuthEvent::SessionExpired);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
