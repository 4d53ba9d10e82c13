//! Integration tests for Countdown Events.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cd-cli migrate
//!
//! # Start the server with a bootstrap admin
//! COUNTDOWN_BOOTSTRAP_ADMIN_EMAIL=... COUNTDOWN_BOOTSTRAP_ADMIN_PASSWORD=... \
//!     cargo run -p countdown-server
//!
//! # Run the ignored tests
//! cargo test -p countdown-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `COUNTDOWN_TEST_BASE_URL` - Server under test (default `http://localhost:3000`)
//! - `COUNTDOWN_TEST_DATABASE_URL` - Database for repository tests
//!   (falls back to `COUNTDOWN_DATABASE_URL`)
//! - `COUNTDOWN_TEST_ADMIN_EMAIL` / `COUNTDOWN_TEST_ADMIN_PASSWORD` - An
//!   existing admin account
//!
//! # Test Categories
//!
//! - `auth` - Registration, login and sessions over HTTP
//! - `events` - Event CRUD, optimistic concurrency, countdown and sharing
//! - `join_requests` - Joining, the owner dashboard and CSV export
//! - `admin` - Admin console over HTTP
//! - `repository` - Repository invariants against the database
//! - `settings` - Settings persistence against the database

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Password used for every account the tests register.
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("COUNTDOWN_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// A URL on the server under test.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A fresh HTTP client with its own cookie jar.
///
/// Each client presents its own `X-Forwarded-For` address so the per-IP
/// auth rate limiter does not throttle the suite.
#[must_use]
pub fn client() -> Client {
    let bytes = Uuid::new_v4().into_bytes();
    let ip = format!("10.{}.{}.{}", bytes[0], bytes[1], bytes[2]);

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&ip).expect("valid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique, valid email address.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// Register a new account on `client`, which is then logged in.
pub async fn register(client: &Client, email: &str) -> Value {
    let resp = client
        .post(url("/api/auth/register"))
        .json(&json!({ "email": email, "password": TEST_PASSWORD, "name": "Test User" }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED, "registration failed");
    resp.json().await.expect("Invalid register response")
}

/// A client registered and logged in as a new user.
pub async fn user_client(prefix: &str) -> (Client, Value) {
    let client = client();
    let user = register(&client, &unique_email(prefix)).await;
    (client, user)
}

/// A client logged in as the configured admin account.
pub async fn admin_client() -> (Client, Value) {
    let email = std::env::var("COUNTDOWN_TEST_ADMIN_EMAIL").expect("COUNTDOWN_TEST_ADMIN_EMAIL not set");
    let password =
        std::env::var("COUNTDOWN_TEST_ADMIN_PASSWORD").expect("COUNTDOWN_TEST_ADMIN_PASSWORD not set");

    let client = client();
    let resp = client
        .post(url("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK, "admin login failed");
    let user = resp.json().await.expect("Invalid login response");
    (client, user)
}

/// A valid event body dated `days` from now.
#[must_use]
pub fn event_body(title: &str, days: i64) -> Value {
    json!({
        "title": title,
        "description": "Integration test event",
        "event_date": in_days(days),
        "event_type": "birthday",
        "is_public": true,
        "allow_join": true,
    })
}

/// An instant `days` from now.
#[must_use]
pub fn in_days(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

/// Create an event on `client` and return it.
pub async fn create_event(client: &Client, body: &Value) -> Value {
    let resp = client
        .post(url("/api/events"))
        .json(body)
        .send()
        .await
        .expect("Failed to create event");
    assert_eq!(resp.status(), StatusCode::CREATED, "event creation failed");
    resp.json().await.expect("Invalid event response")
}

/// Connection pool for repository-level tests.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("COUNTDOWN_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("COUNTDOWN_DATABASE_URL"))
        .expect("COUNTDOWN_TEST_DATABASE_URL not set");
    countdown_server::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database")
}
