//! Public site settings.

use axum::{Json, extract::State};
use serde::Serialize;

use countdown_core::SystemSettings;
use countdown_core::settings::EventTypeOption;

use crate::error::Result;
use crate::state::AppState;

/// The subset of system settings visitors may see.
#[derive(Debug, Serialize)]
pub struct PublicSettings {
    pub site_name: String,
    pub allow_registration: bool,
    pub maintenance_mode: bool,
    pub max_image_size: u32,
    pub event_type_options: Vec<EventTypeOption>,
}

impl From<SystemSettings> for PublicSettings {
    fn from(settings: SystemSettings) -> Self {
        Self {
            event_type_options: settings.event_type_options(),
            allow_registration: settings.allow_registration,
            maintenance_mode: settings.maintenance_mode,
            max_image_size: settings.max_image_size,
            site_name: settings.site_name,
        }
    }
}

/// Settings the client needs to render forms and the header.
pub async fn public(State(state): State<AppState>) -> Result<Json<PublicSettings>> {
    Ok(Json(state.settings().await?.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_settings_hide_limits() {
        let public = PublicSettings::from(SystemSettings::default());
        let json = serde_json::to_value(&public).unwrap_or_default();
        assert!(json.get("max_events_per_user").is_none());
        assert!(json.get("custom_event_types").is_none());
        assert_eq!(json["event_type_options"].as_array().map(Vec::len), Some(public.event_type_options.len()));
    }
}
