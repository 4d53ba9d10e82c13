//! System-wide settings managed from the admin console.

use serde::{Deserialize, Serialize};

use crate::types::{BuiltinEventType, CustomEventType, EventTypeError};

/// Default maximum background image size in megabytes.
pub const DEFAULT_MAX_IMAGE_SIZE_MB: u32 = 10;

/// Largest background image size an admin may configure, in megabytes.
/// Request body limits on the event routes are sized from this.
pub const MAX_IMAGE_SIZE_MB: u32 = 16;

/// Default number of events a non-admin user may own.
pub const DEFAULT_MAX_EVENTS_PER_USER: u32 = 10;

/// Site-wide settings.
///
/// Every field has a default, and deserialization fills in defaults for
/// missing fields, so a stored partial document reads back as "defaults
/// merged with overrides".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSettings {
    pub site_name: String,
    pub allow_registration: bool,
    pub max_events_per_user: u32,
    /// Maximum decoded size of an uploaded background image, in megabytes.
    pub max_image_size: u32,
    pub maintenance_mode: bool,
    /// Built-in type keys users may pick.
    pub enabled_event_types: Vec<String>,
    pub custom_event_types: Vec<CustomEventType>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            site_name: "Countdown Events".to_owned(),
            allow_registration: true,
            max_events_per_user: DEFAULT_MAX_EVENTS_PER_USER,
            max_image_size: DEFAULT_MAX_IMAGE_SIZE_MB,
            maintenance_mode: false,
            enabled_event_types: BuiltinEventType::ALL
                .iter()
                .map(|t| t.key().to_owned())
                .collect(),
            custom_event_types: Vec::new(),
        }
    }
}

/// A selectable event type, built-in or custom, as offered to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTypeOption {
    pub key: String,
    pub label: String,
    pub icon: crate::types::EventIcon,
    pub color: crate::types::ThemeColor,
    pub custom: bool,
}

impl SystemSettings {
    /// Whether users may create events of the given type.
    #[must_use]
    pub fn is_event_type_enabled(&self, key: &str) -> bool {
        if BuiltinEventType::from_key(key).is_some() {
            return self.enabled_event_types.iter().any(|k| k == key);
        }
        self.custom_event_types.iter().any(|t| t.key == key)
    }

    /// Event types users may currently pick, built-ins first.
    #[must_use]
    pub fn event_type_options(&self) -> Vec<EventTypeOption> {
        let builtin = BuiltinEventType::ALL
            .into_iter()
            .filter(|t| self.enabled_event_types.iter().any(|k| k == t.key()))
            .map(|t| EventTypeOption {
                key: t.key().to_owned(),
                label: t.label().to_owned(),
                icon: t.icon(),
                color: t.color(),
                custom: false,
            });
        let custom = self.custom_event_types.iter().map(|t| EventTypeOption {
            key: t.key.clone(),
            label: t.label.clone(),
            icon: t.icon,
            color: t.color,
            custom: true,
        });
        builtin.chain(custom).collect()
    }

    /// Human-readable label for a type key, falling back to the key itself.
    #[must_use]
    pub fn event_type_label(&self, key: &str) -> String {
        if let Some(t) = BuiltinEventType::from_key(key) {
            return t.label().to_owned();
        }
        self.custom_event_types
            .iter()
            .find(|t| t.key == key)
            .map_or_else(|| key.to_owned(), |t| t.label.clone())
    }

    /// Add a custom event type.
    ///
    /// # Errors
    ///
    /// Returns `EventTypeError::Duplicate` if a custom type with the same key
    /// already exists.
    pub fn add_custom_event_type(&mut self, event_type: CustomEventType) -> Result<(), EventTypeError> {
        if self.custom_event_types.iter().any(|t| t.key == event_type.key) {
            return Err(EventTypeError::Duplicate(event_type.key));
        }
        self.custom_event_types.push(event_type);
        Ok(())
    }

    /// Remove a custom event type. Returns whether it existed.
    pub fn remove_custom_event_type(&mut self, key: &str) -> bool {
        let before = self.custom_event_types.len();
        self.custom_event_types.retain(|t| t.key != key);
        self.custom_event_types.len() != before
    }

    /// Drop unknown built-in keys and duplicates from `enabled_event_types`
    /// and pull `max_image_size` into its allowed range.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.enabled_event_types.len());
        for key in self.enabled_event_types {
            if BuiltinEventType::from_key(&key).is_some() && !seen.contains(&key) {
                seen.push(key);
            }
        }
        self.enabled_event_types = seen;
        self.site_name = self.site_name.trim().to_owned();
        if self.site_name.is_empty() {
            self.site_name = Self::default().site_name;
        }
        self.max_image_size = self.max_image_size.clamp(1, MAX_IMAGE_SIZE_MB);
        self
    }

    /// Maximum image size in bytes.
    #[must_use]
    pub const fn max_image_bytes(&self) -> usize {
        self.max_image_size as usize * 1024 * 1024
    }
}
