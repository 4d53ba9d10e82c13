//! Admin system settings and custom event types.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use countdown_core::{CustomEventType, EventIcon, SystemSettings, ThemeColor};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::services::admin::{AdminError, AdminService};
use crate::state::AppState;

/// Body for adding a custom event type.
#[derive(Debug, Deserialize)]
pub struct EventTypeForm {
    pub key: String,
    pub label: String,
    pub icon: EventIcon,
    pub color: ThemeColor,
}

/// Current settings.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<SystemSettings>> {
    Ok(Json(state.settings().await?))
}

/// Replace the settings wholesale. Missing fields take their defaults.
#[instrument(skip(state, admin, settings), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(settings): Json<SystemSettings>,
) -> Result<Json<SystemSettings>> {
    let saved = AdminService::new(state.pool(), state.settings_service())
        .update_settings(settings)
        .await?;
    Ok(Json(saved))
}

/// Add a custom event type.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id, key = %form.key))]
pub async fn add_event_type(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<EventTypeForm>,
) -> Result<(StatusCode, Json<SystemSettings>)> {
    let event_type = CustomEventType::new(&form.key, &form.label, form.icon, form.color)
        .map_err(AdminError::from)?;
    let saved = AdminService::new(state.pool(), state.settings_service())
        .add_event_type(event_type)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Remove a custom event type. Events already using it keep their key.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn remove_event_type(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(key): Path<String>,
) -> Result<Json<SystemSettings>> {
    let saved = AdminService::new(state.pool(), state.settings_service())
        .remove_event_type(&key)
        .await?;
    Ok(Json(saved))
}
