//! Integration tests for registration, login and sessions.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p countdown-server)
//!
//! Run with: cargo test -p countdown-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use countdown_integration_tests::{TEST_PASSWORD, client, register, test_pool, unique_email, url};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_register_logs_in() {
    let client = client();
    let email = unique_email("register");
    let user = register(&client, &email).await;
    assert_eq!(user["email"], email);

    let resp = client.get(url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = resp.json().await.unwrap();
    assert_eq!(me["id"], user["id"]);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_duplicate_registration_is_rejected() {
    let email = unique_email("duplicate");
    register(&client(), &email).await;

    let resp = client()
        .post(url("/api/auth/register"))
        .json(&json!({ "email": email.to_uppercase(), "password": TEST_PASSWORD, "name": "Again" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let pool = test_pool().await;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM countdown.app_user WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_login_logout() {
    let email = unique_email("login");
    register(&client(), &email).await;

    let client = client();
    let resp = client
        .post(url("/api/auth/login"))
        .json(&json!({ "email": email, "password": "wrong password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(url("/api/auth/login"))
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.post(url("/api/auth/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client.get(url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_short_password_is_rejected() {
    let resp = client()
        .post(url("/api/auth/register"))
        .json(&json!({ "email": unique_email("short"), "password": "short", "name": "Shorty" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
