//! Authenticated request pipeline.
//!
//! Every request is built fresh per attempt: the bearer token is read from
//! the coordinator at send time, never cached on the client. A 401 triggers
//! one single-flight token refresh and one retry, tracked by an explicit
//! per-request flag. There is no ambient or global header state.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use quizwire_auth::TokenRefreshCoordinator;

use crate::errors::ApiError;

/// HTTP client with transparent token refresh.
///
/// Cheap to clone. All clones share the coordinator and the underlying
/// connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_base_url: String,
    coordinator: TokenRefreshCoordinator,
}

impl ApiClient {
    /// Create a pipeline over the shared HTTP client.
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

    /// The coordinator backing this pipeline.
    pub fn coordinator(&self) -> &TokenRefreshCoordinator {
        &self.coordinator
    }

    /// Run a request through the auth pipeline.
    ///
    /// `prepare` is applied to a fresh builder on every attempt, so payloads
    /// that cannot be reused (multipart forms) are rebuilt for the retry.
    async fn execute_with<F>(
        &self,
        method: Method,
        path: &str,
        prepare: F,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    {
        let url = format!("{}{path}", self.api_base_url);
        let mut retried = false;
        loop {
            let mut request = prepare(self.http.request(method.clone(), &url));
            if let Some(token) = self.coordinator.access_token() {
                request = request.bearer_auth(token);
            }

            let resp = request.send().await?;
            let status = resp.status().as_u16();

            if (200..300).contains(&status) {
                return Ok(resp);
            }

            if status == 401 {
                // A rejected refresh credential ends the session outright;
                // there is nothing to retry with.
                if path.starts_with("/auth/refresh") {
                    self.coordinator.expire_session();
                    return Err(ApiError::SessionExpired);
                }
                if !retried {
                    debug!(path, "401 received, refreshing access token");
                    if let Err(e) = self.coordinator.invalidate_access_token() {
                        warn!("failed to drop stale access token: {e}");
                    }
                    if self.coordinator.refresh().await.is_err() {
                        return Err(ApiError::SessionExpired);
                    }
                    retried = true;
                    continue;
                }
            }

            let message = error_detail(resp).await;
            return Err(ApiError::Http { status, message });
        }
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.execute_with(Method::GET, path, |r| r).await?;
        Ok(resp.json().await?)
    }

    /// POST a JSON body, expecting a JSON response.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body)?;
        let resp = self
            .execute_with(Method::POST, path, move |r| r.json(&value))
            .await?;
        Ok(resp.json().await?)
    }

    /// PUT a JSON body, expecting a JSON response.
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body)?;
        let resp = self
            .execute_with(Method::PUT, path, move |r| r.json(&value))
            .await?;
        Ok(resp.json().await?)
    }

    /// DELETE a resource, ignoring the response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let _ = self.execute_with(Method::DELETE, path, |r| r).await?;
        Ok(())
    }

    /// POST a multipart form, expecting a JSON response.
    ///
    /// The form is rebuilt for each attempt because multipart bodies are
    /// consumed on send.
    pub async fn post_multipart<T, F>(&self, path: &str, make_form: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::multipart::Form,
    {
        let resp = self
            .execute_with(Method::POST, path, move |r| r.multipart(make_form()))
            .await?;
        Ok(resp.json().await?)
    }
}

/// Pull a human-readable message out of an error response.
///
/// The backend puts its message in a `detail` field; fall back to the raw
/// body when it is absent.
async fn error_detail(resp: reqwest::Response) -> String {
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<Value>(&text) {
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
