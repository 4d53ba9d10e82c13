//! Admin activity log.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use tracing::instrument;

use countdown_core::Page;

use super::ListQuery;
use crate::db::AdminLogRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::AdminLog;
use crate::services::admin::AdminService;
use crate::state::AppState;

/// Result of clearing the log.
#[derive(Debug, Serialize)]
pub struct ClearedLogs {
    pub removed: u64,
}

/// Log entries, newest first.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<AdminLog>>> {
    let page = AdminLogRepository::new(state.pool())
        .list_paginated(query.page_request())
        .await?;
    Ok(Json(page))
}

/// Clear the log. A single entry recording the clear remains.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<ClearedLogs>> {
    let removed = AdminService::new(state.pool(), state.settings_service())
        .clear_logs()
        .await?;
    Ok(Json(ClearedLogs { removed }))
}
