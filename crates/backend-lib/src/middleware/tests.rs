use super::*;
use crate::auth::{
    InMemorySessionRegistry, ManualClock, Session, SessionCookie, SessionRegistry, SESSION_TTL,
};
use crate::error::AuthError;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use chrono::TimeDelta;
use std::sync::Arc;
use tower::ServiceExt;

async fn whoami(identity: Identity) -> String {
    format!("{}:{}", identity.user_id, identity.username)
}

struct Fixture {
    app: Router,
    registry: Arc<InMemorySessionRegistry>,
    clock: Arc<ManualClock>,
}

fn fixture() -> Fixture {
    let clock = Arc::new(ManualClock::starting_now());
    let registry = Arc::new(InMemorySessionRegistry::new(SESSION_TTL, clock.clone()));
    let gate = AccessGate::new(registry.clone(), SessionCookie::default());

    let app = Router::new()
        .route("/submit-cart", post(whoami))
        .layer(axum::middleware::from_fn_with_state(gate, require_session));

    Fixture {
        app,
        registry,
        clock,
    }
}

/// Registry whose backing store cannot be reached
struct UnreachableRegistry;

#[async_trait]
impl SessionRegistry for UnreachableRegistry {
    async fn create(&self, _user_id: i64, _username: &str) -> Result<Session, AuthError> {
        Err(AuthError::StoreUnavailable("connection refused".into()))
    }

    async fn resolve(&self, _token: &str) -> Result<Session, AuthError> {
        Err(AuthError::StoreUnavailable("connection refused".into()))
    }

    async fn revoke(&self, _token: &str) -> Result<(), AuthError> {
        Err(AuthError::StoreUnavailable("connection refused".into()))
    }
}

fn unreachable_app() -> Router {
    let gate = AccessGate::new(Arc::new(UnreachableRegistry), SessionCookie::default());
    Router::new()
        .route("/submit-cart", post(whoami))
        .layer(axum::middleware::from_fn_with_state(gate, require_session))
}

fn request(cookie: Option<&str>, json: bool) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/submit-cart");
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("spice_paradise_session={token}"));
    }
    if json {
        builder = builder.header(header::ACCEPT, "application/json");
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_valid_session_passes_identity() {
    let Fixture { app, registry, .. } = fixture();
    let session = registry.create(7, "alice").await.unwrap();

    let response = app
        .oneshot(request(Some(&session.token), false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_string(response).await, "7:alice");
}

#[tokio::test]
async fn test_missing_cookie_programmatic_gets_401_json() {
    let Fixture { app, .. } = fixture();

    let response = app.oneshot(request(None, true)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_string(response).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Authentication required. Please login.");
}

#[tokio::test]
async fn test_missing_cookie_browser_is_redirected() {
    let Fixture { app, .. } = fixture();

    let response = app.oneshot(request(None, false)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login?error=Please+login+to+access+this+page."
    );
}

#[tokio::test]
async fn test_xhr_header_counts_as_programmatic() {
    let Fixture { app, .. } = fixture();
    let request = Request::builder()
        .method("POST")
        .uri("/submit-cart")
        .header("X-Requested-With", "XMLHttpRequest")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_token_clears_cookie() {
    let Fixture { app, .. } = fixture();

    let response = app
        .oneshot(request(Some("forged-token"), true))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.starts_with("spice_paradise_session=;"));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_expired_session_is_rejected_and_evicted() {
    let Fixture {
        app,
        registry,
        clock,
    } = fixture();
    let session = registry.create(7, "alice").await.unwrap();
    clock.advance(TimeDelta::hours(24));

    let response = app
        .clone()
        .oneshot(request(Some(&session.token), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
    assert!(registry.is_empty());

    // winding the clock back does not resurrect it
    clock.advance(TimeDelta::hours(-24));
    let response = app
        .oneshot(request(Some(&session.token), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_check_decision_value() {
    let clock = Arc::new(ManualClock::starting_now());
    let registry = Arc::new(InMemorySessionRegistry::new(SESSION_TTL, clock));
    let gate = AccessGate::new(registry.clone(), SessionCookie::default());
    let session = registry.create(3, "carol").await.unwrap();

    let mut headers = axum::http::HeaderMap::new();
    headers.insert(
        header::COOKIE,
        format!("spice_paradise_session={}", session.token)
            .parse()
            .unwrap(),
    );
    match gate.check(&headers).await {
        GateDecision::Allow(identity) => assert_eq!(
            identity,
            Identity {
                user_id: 3,
                username: "carol".to_string()
            }
        ),
        GateDecision::Deny(denial) => panic!("unexpected denial: {denial:?}"),
    }

    registry.revoke(&session.token).await.unwrap();
    match gate.check(&headers).await {
        GateDecision::Deny(denial) => {
            assert_eq!(denial.reason, DenyReason::Invalid);
            assert_eq!(denial.client, ClientKind::Browser);
            assert!(denial.clears_cookie());
        }
        GateDecision::Allow(_) => panic!("revoked session was allowed"),
    }

    assert_eq!(gate.identify(&headers).await, None);
}

#[tokio::test]
async fn test_unreachable_registry_programmatic_gets_503_and_keeps_cookie() {
    let response = unreachable_app()
        .oneshot(request(Some("some-token"), true))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        json["error"],
        "Service temporarily unavailable. Please try again."
    );
}

#[tokio::test]
async fn test_unreachable_registry_browser_is_asked_to_retry() {
    let response = unreachable_app()
        .oneshot(request(Some("some-token"), false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login?error=Service+temporarily+unavailable.+Please+try+again."
    );
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_unreachable_registry_reads_as_anonymous() {
    let gate = AccessGate::new(Arc::new(UnreachableRegistry), SessionCookie::default());
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(header::COOKIE, "spice_paradise_session=abc".parse().unwrap());

    match gate.check(&headers).await {
        GateDecision::Deny(denial) => {
            assert_eq!(denial.reason, DenyReason::Unavailable);
            assert!(!denial.clears_cookie());
        }
        GateDecision::Allow(_) => panic!("unreachable registry allowed a request"),
    }
    assert_eq!(gate.identify(&headers).await, None);
}
