//! Admin console API.
//!
//! Every handler takes `RequireAdmin`, which re-checks the admin flag in the
//! database on each request.
//!
//! ```text
//! GET    /api/admin/stats
//! GET    /api/admin/users?search=&page=
//! DELETE /api/admin/users/{id}
//! POST   /api/admin/users/{id}/admin           {is_admin}
//! GET    /api/admin/events?search=&page=
//! DELETE /api/admin/events/{id}
//! POST   /api/admin/events/{id}/visibility     {is_public}
//! GET    /api/admin/messages?search=&filter=&page=
//! POST   /api/admin/messages/{id}/read|unread|archive|unarchive
//! DELETE /api/admin/messages/{id}
//! POST   /api/admin/messages/{id}/reply        {subject, body}
//! GET    /api/admin/messages/{id}/replies
//! GET    /api/admin/join-requests?page=
//! GET    /api/admin/join-requests/export
//! GET    /api/admin/settings
//! PUT    /api/admin/settings
//! POST   /api/admin/settings/event-types
//! DELETE /api/admin/settings/event-types/{key}
//! GET    /api/admin/logs?page=
//! DELETE /api/admin/logs
//! ```

pub mod events;
pub mod join_requests;
pub mod logs;
pub mod messages;
pub mod settings;
pub mod users;

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use countdown_core::PageRequest;

use crate::db::stats::{AdminStats, admin_stats};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Search and page parameters shared by admin listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl ListQuery {
    /// Trimmed search term, if any.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Requested page (1-based, clamped later against the total).
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page)
    }
}

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        // Users
        .route("/users", get(users::index))
        .route("/users/{id}", delete(users::delete))
        .route("/users/{id}/admin", post(users::set_admin))
        // Events
        .route("/events", get(events::index))
        .route("/events/{id}", delete(events::delete))
        .route("/events/{id}/visibility", post(events::set_visibility))
        // Messages
        .route("/messages", get(messages::index))
        .route("/messages/{id}", delete(messages::delete))
        .route("/messages/{id}/read", post(messages::mark_read))
        .route("/messages/{id}/unread", post(messages::mark_unread))
        .route("/messages/{id}/archive", post(messages::archive))
        .route("/messages/{id}/unarchive", post(messages::unarchive))
        .route("/messages/{id}/reply", post(messages::reply))
        .route("/messages/{id}/replies", get(messages::replies))
        // Join requests
        .route("/join-requests", get(join_requests::index))
        .route("/join-requests/export", get(join_requests::export))
        // Settings
        .route("/settings", get(settings::show).put(settings::update))
        .route("/settings/event-types", post(settings::add_event_type))
        .route(
            "/settings/event-types/{key}",
            delete(settings::remove_event_type),
        )
        // Logs
        .route("/logs", get(logs::index).delete(logs::clear))
}

/// Site-wide counts.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<AdminStats>> {
    Ok(Json(admin_stats(state.pool(), Utc::now()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query() {
        let query = ListQuery {
            search: Some("  ".to_owned()),
            page: None,
        };
        assert_eq!(query.search(), None);
        assert_eq!(query.page_request().page, 1);

        let query = ListQuery {
            search: Some(" ana ".to_owned()),
            page: Some(3),
        };
        assert_eq!(query.search(), Some("ana"));
        assert_eq!(query.page_request().page, 3);
    }
}
