//! # quizwire-auth
//!
//! Credential storage and token refresh for the Quizwire client.
//!
//! The access token is short-lived and kept in memory plus an optional
//! persistent [`CredentialStore`]. The refresh credential is an httponly
//! cookie scoped to the refresh endpoint: it never passes through this
//! crate's storage and rides along automatically on the shared
//! cookie-enabled HTTP client.
//!
//! [`TokenRefreshCoordinator::refresh`] is single-flight: concurrent
//! callers while a refresh is in flight all await the same request and
//! observe the same outcome.

#![deny(unsafe_code)]

pub mod client;
pub mod credentials;
pub mod errors;
pub mod refresh;
pub mod store;

pub use client::AuthClient;
pub use credentials::{Credentials, UserProfile};
pub use errors::{AuthError, RefreshError};
pub use refresh::{AuthEvent, TokenRefreshCoordinator};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};

/// Build the shared HTTP client used by login, refresh, and API requests.
///
/// The cookie store must be enabled so the httponly refresh cookie set at
/// login is presented on subsequent refresh calls.
pub fn shared_http_client() -> Result<reqwest::Client, AuthError> {
    Ok(reqwest::Client::builder().cookie_store(true).build()?)
}
