//! Settings database operations.
//!
//! Settings are JSONB documents keyed by name. The system settings live
//! under a single key and are read and written wholesale.

use serde_json::{Map, Value as JsonValue};
use sqlx::{PgConnection, PgPool};
use tracing::warn;

use countdown_core::SystemSettings;

use super::RepositoryError;

/// Key of the system settings document.
pub const SYSTEM_SETTINGS_KEY: &str = "system";

/// Repository for settings documents.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a raw settings document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<JsonValue>, RepositoryError> {
        let value =
            sqlx::query_scalar::<_, JsonValue>("SELECT value FROM countdown.setting WHERE key = $1")
                .bind(key)
                .fetch_optional(self.pool)
                .await?;
        Ok(value)
    }

    /// Insert or replace a raw settings document inside a caller-owned
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_in(
        conn: &mut PgConnection,
        key: &str,
        value: &JsonValue,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO countdown.setting (key, value)
             VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Load system settings: stored overrides merged over defaults.
    ///
    /// Fields of the wrong type are dropped with a warning and take their
    /// defaults, so a damaged document never takes the site down.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn load_system(&self) -> Result<SystemSettings, RepositoryError> {
        Ok(self
            .get(SYSTEM_SETTINGS_KEY)
            .await?
            .map_or_else(SystemSettings::default, decode_system))
    }

    /// Save system settings inside a caller-owned transaction, replacing
    /// the stored document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save_system_in(
        conn: &mut PgConnection,
        settings: &SystemSettings,
    ) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(settings)
            .map_err(|e| RepositoryError::DataCorruption(format!("unserializable settings: {e}")))?;
        Self::set_in(conn, SYSTEM_SETTINGS_KEY, &value).await
    }
}

fn decode_system(value: JsonValue) -> SystemSettings {
    match serde_json::from_value::<SystemSettings>(value.clone()) {
        Ok(settings) => settings.normalized(),
        Err(e) => {
            warn!(error = %e, "Stored system settings are invalid, keeping the valid fields");
            keep_valid_fields(value).normalized()
        }
    }
}

/// Rebuild settings from the stored fields that decode on their own.
fn keep_valid_fields(value: JsonValue) -> SystemSettings {
    let JsonValue::Object(stored) = value else {
        return SystemSettings::default();
    };

    let mut kept = Map::new();
    for (key, field) in stored {
        let mut candidate = kept.clone();
        candidate.insert(key.clone(), field.clone());
        if serde_json::from_value::<SystemSettings>(JsonValue::Object(candidate)).is_ok() {
            kept.insert(key, field);
        }
    }
    serde_json::from_value(JsonValue::Object(kept)).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_takes_defaults() {
        let settings =
            decode_system(serde_json::json!({ "site_name": "My Countdowns", "maintenance_mode": true }));
        assert_eq!(settings.site_name, "My Countdowns");
        assert!(settings.maintenance_mode);
        assert!(settings.allow_registration);
        assert_eq!(settings.max_events_per_user, SystemSettings::default().max_events_per_user);
    }

    #[test]
    fn test_wrong_types_fall_back_to_defaults() {
        let settings = decode_system(serde_json::json!({
            "max_image_size": "big",
            "site_name": "Still Here",
            "allow_registration": "nope",
        }));
        let defaults = SystemSettings::default();
        assert_eq!(settings.max_image_size, defaults.max_image_size);
        assert_eq!(settings.allow_registration, defaults.allow_registration);
        assert_eq!(settings.site_name, "Still Here");
    }

    #[test]
    fn test_non_object_document_is_defaults() {
        assert_eq!(decode_system(serde_json::json!([1, 2, 3])), SystemSettings::default());
        assert_eq!(decode_system(JsonValue::Null), SystemSettings::default());
    }
}
