//! Token refresh scenarios against a mock auth server.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quizwire_auth::{
    AuthEvent, CredentialStore, MemoryCredentialStore, TokenRefreshCoordinator, UserProfile,
};

fn make_coordinator(api_base: &str) -> (TokenRefreshCoordinator, Arc<MemoryCredentialStore>) {
    let http = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator =
        TokenRefreshCoordinator::new(http, api_base, Arc::clone(&store) as Arc<dyn CredentialStore>);
    (coordinator, store)
}

fn sample_user() -> UserProfile {
    UserProfile {
        id: 1,
        username: "host".to_string(),
    }
}

#[tokio::test]
async fn refresh_success_installs_new_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (coordinator, store) = make_coordinator(&server.uri());
    coordinator.install("stale-token", sample_user()).unwrap();

    let token = coordinator.refresh().await.unwrap();

    assert_eq!(token, "fresh-token");
    assert_eq!(coordinator.access_token().as_deref(), Some("fresh-token"));
    assert_eq!(store.get("access_token").as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn concurrent_refreshes_make_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(100))
                .set_body_json(serde_json::json!({"access_token": "fresh-token"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (coordinator, _store) = make_coordinator(&server.uri());
    coordinator.install("stale-token", sample_user()).unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let c = coordinator.clone();
        handles.push(tokio::spawn(async move { c.refresh().await }));
    }

    for handle in handles {
        let token = handle.await.unwrap().unwrap();
        assert_eq!(token, "fresh-token");
    }
    // Mock expect(1) verifies exactly one request on drop
}

#[tokio::test]
async fn sequential_refreshes_make_separate_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (coordinator, _store) = make_coordinator(&server.uri());
    coordinator.install("stale-token", sample_user()).unwrap();

    coordinator.refresh().await.unwrap();
    coordinator.refresh().await.unwrap();
}

#[tokio::test]
async fn refresh_rejection_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Refresh token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (coordinator, store) = make_coordinator(&server.uri());
    coordinator.install("stale-token", sample_user()).unwrap();
    let mut events = coordinator.subscribe();
    // Drain the LoggedIn from install
    let _ = events.try_recv();

    let err = coordinator.refresh().await.unwrap_err();

    assert_eq!(err.status, Some(401));
    assert!(!coordinator.is_authenticated());
    assert!(coordinator.user().is_none());
    assert!(store.get("access_token").is_none());
    assert!(store.get("user").is_none());
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SessionExpired);
}

#[tokio::test]
async fn refresh_network_error_expires_session() {
    // Nothing is listening on this port
    let (coordinator, _store) = make_coordinator("http://127.0.0.1:9");
    coordinator.install("stale-token", sample_user()).unwrap();
    let mut events = coordinator.subscribe();
    let _ = events.try_recv();

    let err = coordinator.refresh().await.unwrap_err();

    assert_eq!(err.status, None);
    assert!(!coordinator.is_authenticated());
    assert_eq!(events.try_recv().unwrap(), AuthEvent::SessionExpired);
}

#[tokio::test]
async fn concurrent_failures_share_one_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_delay(Duration::from_millis(100))
                .set_body_json(serde_json::json!({"detail": "Refresh token expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (coordinator, _store) = make_coordinator(&server.uri());
    coordinator.install("stale-token", sample_user()).unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let c = coordinator.clone();
        handles.push(tokio::spawn(async move { c.refresh().await }));
    }

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err.status, Some(401));
    }
}

#[tokio::test]
async fn refresh_after_resolution_starts_fresh_request() {
    let server = MockServer::start().await;
    // First refresh fails, second succeeds: distinct requests, not a cached error
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "second-wind"
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let (coordinator, _store) = make_coordinator(&server.uri());
    coordinator.install("stale-token", sample_user()).unwrap();

    assert!(coordinator.refresh().await.is_err());
    let token = coordinator.refresh().await.unwrap();
    assert_eq!(token, "second-wind");
}
