//! Admin user management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use countdown_core::{Page, UserId};

use super::ListQuery;
use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::services::admin::AdminService;
use crate::state::AppState;

/// Body for granting or revoking admin access.
#[derive(Debug, Deserialize)]
pub struct SetAdminForm {
    pub is_admin: bool,
}

/// Users matching a name/email search.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<User>>> {
    let page = UserRepository::new(state.pool())
        .list_paginated(query.search(), query.page_request())
        .await?;
    Ok(Json(page))
}

/// Delete a user and their events.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    AdminService::new(state.pool(), state.settings_service())
        .delete_user(admin.id, UserId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Grant or revoke admin access.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn set_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i32>,
    Json(form): Json<SetAdminForm>,
) -> Result<Json<User>> {
    let user = AdminService::new(state.pool(), state.settings_service())
        .set_user_admin(admin.id, UserId::new(id), form.is_admin)
        .await?;
    Ok(Json(user))
}
