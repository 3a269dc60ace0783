//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Duration;
use quill_api::{build_router, AppState};
use quill_core::{SessionManager, SessionPolicy};
use quill_infrastructure::InMemoryStore;
use quill_security::{PasswordService, TokenCodec};
use quill_shared::ManualClock;
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "http-test-secret-http-test-secret-xx";

struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
}

fn app() -> TestApp {
    let clock = Arc::new(ManualClock::starting_now());
    let store = Arc::new(InMemoryStore::new());
    let manager = SessionManager::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(TokenCodec::new(SECRET, Duration::minutes(15), clock.clone())),
        Arc::new(PasswordService::new(8, 1, 1).unwrap()),
        clock.clone(),
        SessionPolicy { max_sessions_per_user: 2 },
    );
    TestApp {
        router: build_router(AppState::new(Arc::new(manager))),
        clock,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, "quill-tests/1.0")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &TestApp, username: &str, password: &str, role: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({ "username": username, "password": password, "role": role })),
    )
    .await
}

async fn login(app: &TestApp, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

async fn login_token(app: &TestApp, username: &str, password: &str) -> String {
    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_login_me() {
    let app = app();

    let (status, body) = register(&app, "alice", "pw1", "user").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password_hash").is_none());
    let alice_id = body["data"]["id"].clone();

    let token = login_token(&app, "alice", "pw1").await;
    let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], alice_id);
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn test_error_mapping() {
    let app = app();
    register(&app, "alice", "pw1", "user").await;

    let (status, body) = register(&app, "alice", "pw9", "user").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "USER_EXISTS");

    let (status, body) = login(&app, "alice", "wrongpw").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_PASSWORD");

    let (status, body) = login(&app, "carol", "pw3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "USER_NOT_FOUND");

    let (status, body) = send(&app, "GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_MISSING");

    let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_request_shape_errors_are_validation_errors() {
    let app = app();

    let (status, body) = register(&app, "al", "pw1", "user").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = register(&app, "mallory", "pw1", "root").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = app();
    register(&app, "alice", "pw1", "user").await;
    let token = login_token(&app, "alice", "pw1").await;

    let (status, _) = send(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_REVOKED");

    // Logging out twice is not an error.
    let (status, _) = send(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token() {
    let app = app();
    register(&app, "alice", "pw1", "user").await;
    let token = login_token(&app, "alice", "pw1").await;

    app.clock.advance(Duration::minutes(16));
    let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_sessions_lists_live_sessions_and_marks_current() {
    let app = app();
    register(&app, "alice", "pw1", "user").await;
    let first = login_token(&app, "alice", "pw1").await;
    app.clock.advance(Duration::seconds(1));
    let second = login_token(&app, "alice", "pw1").await;
    app.clock.advance(Duration::seconds(1));
    let third = login_token(&app, "alice", "pw1").await;

    // Cap of two: the first login was evicted.
    let (status, _) = send(&app, "GET", "/api/v1/auth/me", Some(&first), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/v1/auth/sessions", Some(&third), None).await;
    assert_eq!(status, StatusCode::OK);
    let sessions = body["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["current"], false);
    assert_eq!(sessions[1]["current"], true);
    assert_eq!(sessions[1]["user_agent"], "quill-tests/1.0");
    assert!(sessions.iter().all(|s| s.get("token").is_none()));

    let (status, _) = send(&app, "GET", "/api/v1/auth/me", Some(&second), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_revoke_sessions() {
    let app = app();
    register(&app, "alice", "pw1", "user").await;
    register(&app, "bob", "pw2", "admin").await;
    let alice = login_token(&app, "alice", "pw1").await;
    let bob = login_token(&app, "bob", "pw2").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/admin/users/bob/revoke-sessions",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/admin/users/alice/revoke-sessions",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revoked"], 1);

    let (status, body) = send(&app, "GET", "/api/v1/auth/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "TOKEN_REVOKED");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/admin/users/nobody/revoke-sessions",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "USER_NOT_FOUND");
}
