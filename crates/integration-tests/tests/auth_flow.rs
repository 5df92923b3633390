//! Integration tests for shopper authentication: login and logout publish
//! immediately and each shopper has an independent status.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};
use sunbloom_integration_tests::{EMAIL, PASSWORD, TestApp};

fn credentials(password: &str) -> Value {
    json!({ "email": EMAIL, "password": password })
}

#[tokio::test]
async fn test_status_starts_signed_out() {
    let mut app = TestApp::spawn().await;

    let response = app.client.get("/auth/status").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "isAuthenticated": false, "profile": null })
    );
}

#[tokio::test]
async fn test_login_publishes_immediately() {
    let mut app = TestApp::spawn().await;
    app.client.get("/auth/status").await;
    let before = app.client.cookie().map(String::from);

    let response = app.client.post("/auth/login", credentials(PASSWORD)).await;
    assert_eq!(response.status, StatusCode::OK);

    let session = response.json();
    assert_eq!(session["isAuthenticated"], true);
    assert_eq!(session["profile"]["email"], EMAIL);
    assert_eq!(session["profile"]["first_name"], "Ada");

    // Session id is rotated on login
    assert_ne!(app.client.cookie().map(String::from), before);

    let status = app.client.get("/auth/status").await.json();
    assert_eq!(status["isAuthenticated"], true);
}

#[tokio::test]
async fn test_bad_credentials_rejected() {
    let mut app = TestApp::spawn().await;

    let response = app.client.post("/auth/login", credentials("wrong")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let status = app.client.get("/auth/status").await.json();
    assert_eq!(status["isAuthenticated"], false);
}

#[tokio::test]
async fn test_blocked_account_forbidden() {
    let mut app = TestApp::spawn().await;
    app.backend.block_account();

    let response = app.client.post("/auth/login", credentials(PASSWORD)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(
        response.json()["error"]
            .as_str()
            .unwrap()
            .contains("blocked")
    );
}

#[tokio::test]
async fn test_logout_clears_state_and_tells_backend() {
    let mut app = TestApp::spawn().await;
    app.client.post("/auth/login", credentials(PASSWORD)).await;

    let response = app.client.post_empty("/auth/logout").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["isAuthenticated"], false);
    assert_eq!(app.backend.logouts(), 1);

    let status = app.client.get("/auth/status").await.json();
    assert_eq!(status["isAuthenticated"], false);
    assert_eq!(status["profile"], Value::Null);
}

#[tokio::test]
async fn test_logout_when_signed_out_skips_backend() {
    let mut app = TestApp::spawn().await;

    let response = app.client.post_empty("/auth/logout").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.backend.logouts(), 0);
}

#[tokio::test]
async fn test_status_is_per_shopper() {
    let mut app = TestApp::spawn().await;
    app.client.post("/auth/login", credentials(PASSWORD)).await;

    let mut other = app.client.another_shopper();
    let status = other.get("/auth/status").await.json();
    assert_eq!(status["isAuthenticated"], false);

    let status = app.client.get("/auth/status").await.json();
    assert_eq!(status["isAuthenticated"], true);
}

#[tokio::test]
async fn test_login_keeps_order_draft() {
    let mut app = TestApp::spawn().await;
    app.client.post("/order/size", json!({ "sizeId": "small" })).await;
    app.client.post("/auth/login", credentials(PASSWORD)).await;

    let view = app.client.get("/order").await.json();
    assert_eq!(view["draft"]["selectedSize"]["id"], "small");
}
