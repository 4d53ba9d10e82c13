//! Maintenance mode gate.
//!
//! While `maintenance_mode` is on, public pages and the user-facing API
//! answer 503. Health checks, authentication, the admin API and public
//! settings stay reachable, and signed-in admins pass through everywhere.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::warn;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::models::session::keys;
use crate::state::AppState;

const EXEMPT_PREFIXES: &[&str] = &[
    "/health",
    "/static/",
    "/api/auth/",
    "/api/admin/",
    "/api/settings/public",
];

/// Whether a path stays available during maintenance.
#[must_use]
pub fn is_exempt(path: &str) -> bool {
    EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

async fn is_admin_session(state: &AppState, session: Option<Session>) -> bool {
    let Some(session) = session else {
        return false;
    };
    let Ok(Some(user)) = session.get::<CurrentUser>(keys::CURRENT_USER).await else {
        return false;
    };
    matches!(
        UserRepository::new(state.pool()).is_admin(user.id).await,
        Ok(Some(true))
    )
}

/// Middleware that answers 503 for gated routes during maintenance.
pub async fn maintenance_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    let is_api = path.starts_with("/api/");
    if is_exempt(path) {
        return next.run(request).await;
    }

    let maintenance = match state.settings().await {
        Ok(settings) => settings.maintenance_mode,
        Err(e) => {
            warn!(error = %e, "Could not load settings for maintenance check");
            false
        }
    };
    let session = request.extensions().get::<Session>().cloned();
    if !maintenance || is_admin_session(&state, session).await {
        return next.run(request).await;
    }

    if is_api {
        AppError::Unavailable("The site is down for maintenance".to_owned()).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Html(
                "<!doctype html><title>Maintenance</title>\
                 <h1>We'll be right back</h1>\
                 <p>The site is down for scheduled maintenance.</p>",
            ),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exempt_paths() {
        assert!(is_exempt("/health"));
        assert!(is_exempt("/health/ready"));
        assert!(is_exempt("/api/auth/login"));
        assert!(is_exempt("/api/admin/settings"));
        assert!(is_exempt("/api/settings/public"));
        assert!(!is_exempt("/"));
        assert!(!is_exempt("/event/aB3dE5gH"));
        assert!(!is_exempt("/api/events"));
        assert!(!is_exempt("/api/dashboard/events"));
    }
}
