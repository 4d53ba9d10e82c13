//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Public event gallery
//! GET  /event/{id}                - Event page with live countdown
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database)
//!
//! # Auth (rate limited)
//! POST /api/auth/register         - Create an account and log in
//! POST /api/auth/login            - Log in
//! POST /api/auth/logout           - Log out
//! GET  /api/auth/me               - Current user
//!
//! # Events
//! GET  /api/events                - Public events (?type=&upcoming=)
//! POST /api/events                - Create event (auth)
//! GET  /api/events/{id}           - Event detail
//! PUT  /api/events/{id}           - Overwrite event (owner/admin)
//! DELETE /api/events/{id}         - Delete event (owner/admin)
//! GET  /api/events/{id}/countdown - Countdown snapshot
//! GET  /api/events/{id}/countdown/stream - Countdown SSE stream
//! GET  /api/events/{id}/share     - Share links
//! POST /api/events/{id}/join      - Join request
//!
//! # Dashboard (auth)
//! GET  /api/dashboard/events      - Own events with countdowns
//! GET  /api/dashboard/stats       - Own event statistics
//! GET  /api/dashboard/join-requests            - Own join requests
//! GET  /api/dashboard/join-requests/export     - CSV export
//! POST /api/dashboard/join-requests/{id}/read  - Mark read
//! POST /api/dashboard/join-requests/{id}/unread - Mark unread
//! GET  /api/dashboard/join-requests/{id}/reply-link - mailto link
//! DELETE /api/dashboard/join-requests/{id}     - Delete
//!
//! # Misc
//! POST /api/contact               - Contact form
//! GET  /api/settings/public       - Public site settings
//!
//! # Admin (see `admin` module)
//! /api/admin/*
//! ```

pub mod admin;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod events;
pub mod home;
pub mod settings;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use countdown_core::settings::MAX_IMAGE_SIZE_MB;

use crate::middleware::{
    auth_rate_limiter, create_session_layer, maintenance_middleware, request_id_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/server/static";

/// Largest accepted event request body: two base64 data URLs at the
/// highest configurable image size, plus room for the other fields.
const EVENT_BODY_LIMIT: usize =
    2 * (MAX_IMAGE_SIZE_MB as usize * 1024 * 1024).div_ceil(3) * 4 + 64 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .layer(auth_rate_limiter())
}

/// Create the event API routes router.
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(events::index).post(events::create))
        .route(
            "/{id}",
            get(events::show).put(events::update).delete(events::delete),
        )
        .route("/{id}/countdown", get(events::countdown))
        .route("/{id}/countdown/stream", get(events::countdown_stream))
        .route("/{id}/share", get(events::share))
        .route("/{id}/join", post(events::join))
        .layer(DefaultBodyLimit::max(EVENT_BODY_LIMIT))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(dashboard::events))
        .route("/stats", get(dashboard::stats))
        .route("/join-requests", get(dashboard::join_requests))
        .route("/join-requests/export", get(dashboard::export))
        .route("/join-requests/{id}", delete(dashboard::delete_request))
        .route("/join-requests/{id}/read", post(dashboard::mark_read))
        .route("/join-requests/{id}/unread", post(dashboard::mark_unread))
        .route("/join-requests/{id}/reply-link", get(dashboard::reply_link))
}

/// Create all routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Public pages
        .route("/", get(home::home))
        .route("/event/{id}", get(home::event_page))
        // Health checks
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // JSON API
        .nest("/api/auth", auth_routes())
        .nest("/api/events", event_routes())
        .nest("/api/dashboard", dashboard_routes())
        .nest("/api/admin", admin::routes())
        .route("/api/contact", post(contact::submit))
        .route("/api/settings/public", get(settings::public))
}

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests can run without a hub.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.pool(), state.config());

    routes()
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(from_fn_with_state(state.clone(), maintenance_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use countdown_core::SystemSettings;

    use super::test_support::lazy_state;
    use super::*;

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(lazy_state(SystemSettings::default()).await);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_dashboard_requires_login() {
        let app = app(lazy_state(SystemSettings::default()).await);
        let (status, json) = send(app, "GET", "/api/dashboard/events").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Please log in");
    }

    #[tokio::test]
    async fn test_admin_requires_login() {
        let app = app(lazy_state(SystemSettings::default()).await);
        let (status, _) = send(app, "GET", "/api/admin/stats").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    fn join_body(message_len: usize) -> Body {
        let body = serde_json::json!({
            "name": "Guest",
            "email": "guest@example.com",
            "message": "x".repeat(message_len),
        });
        Body::from(serde_json::to_vec(&body).unwrap())
    }

    async fn post_join(body: Body) -> StatusCode {
        let app = app(lazy_state(SystemSettings::default()).await);
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/events/not-an-id/join")
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn test_event_routes_accept_image_sized_bodies() {
        // Larger than axum's 2 MB default, so only the route limit lets it through
        assert_eq!(post_join(join_body(3 * 1024 * 1024)).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_event_routes_reject_bodies_over_limit() {
        assert_eq!(
            post_join(join_body(EVENT_BODY_LIMIT + 1)).await,
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[tokio::test]
    async fn test_malformed_event_id_is_not_found() {
        let app = app(lazy_state(SystemSettings::default()).await);
        let (status, json) = send(app, "GET", "/api/events/not-an-id/countdown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Event not found");
    }

    #[tokio::test]
    async fn test_public_settings_are_served_from_cache() {
        let settings = SystemSettings {
            site_name: "Launch Clock".to_owned(),
            ..SystemSettings::default()
        };
        let app = app(lazy_state(settings).await);
        let (status, json) = send(app, "GET", "/api/settings/public").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["site_name"], "Launch Clock");
        assert!(json["event_type_options"].is_array());
    }

    #[tokio::test]
    async fn test_maintenance_blocks_public_api() {
        let settings = SystemSettings {
            maintenance_mode: true,
            ..SystemSettings::default()
        };
        let app = app(lazy_state(settings).await);
        let (status, json) = send(app.clone(), "GET", "/api/events").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "The site is down for maintenance");

        let (status, _) = send(app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}
