//! Event type categories.
//!
//! Events carry a string type key. Built-in keys come from
//! [`BuiltinEventType`]; admins can add [`CustomEventType`]s whose icon and
//! color are chosen from closed sets so every type is renderable.

use serde::{Deserialize, Serialize};

/// Maximum length of an event type key.
pub const MAX_KEY_LENGTH: usize = 32;

/// Maximum length of a custom event type label.
pub const MAX_LABEL_LENGTH: usize = 40;

/// Errors from event type validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EventTypeError {
    /// The key is empty, too long, or has characters outside `[a-z0-9-]`.
    #[error("event type key must be 1-{MAX_KEY_LENGTH} lowercase letters, digits or hyphens")]
    InvalidKey,
    /// The key is already used by a built-in type.
    #[error("event type '{0}' is built in")]
    Builtin(String),
    /// A custom type with this key already exists.
    #[error("event type '{0}' already exists")]
    Duplicate(String),
    /// The label is empty or too long.
    #[error("event type label must be 1-{MAX_LABEL_LENGTH} characters")]
    InvalidLabel,
}

/// Event types that ship with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinEventType {
    Wedding,
    Birthday,
    Launch,
    Custom,
}

impl BuiltinEventType {
    /// All built-in types, in display order.
    pub const ALL: [Self; 4] = [Self::Wedding, Self::Birthday, Self::Launch, Self::Custom];

    /// The stored key for this type.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Wedding => "wedding",
            Self::Birthday => "birthday",
            Self::Launch => "launch",
            Self::Custom => "custom",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Wedding => "Wedding",
            Self::Birthday => "Birthday",
            Self::Launch => "Launch",
            Self::Custom => "Custom Event",
        }
    }

    /// Default icon for this type.
    #[must_use]
    pub const fn icon(self) -> EventIcon {
        match self {
            Self::Wedding => EventIcon::Heart,
            Self::Birthday => EventIcon::Cake,
            Self::Launch => EventIcon::Rocket,
            Self::Custom => EventIcon::Calendar,
        }
    }

    /// Default color for this type.
    #[must_use]
    pub const fn color(self) -> ThemeColor {
        match self {
            Self::Wedding => ThemeColor::Pink,
            Self::Birthday => ThemeColor::Purple,
            Self::Launch => ThemeColor::Blue,
            Self::Custom => ThemeColor::Gray,
        }
    }

    /// Look up a built-in type by key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

/// Icons a type can render with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventIcon {
    Heart,
    Cake,
    Rocket,
    Calendar,
    Star,
    Gift,
    Music,
    Trophy,
    Plane,
    GraduationCap,
}

/// Accent colors a type can render with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeColor {
    Pink,
    Purple,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
    Gray,
}

/// An admin-defined event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEventType {
    pub key: String,
    pub label: String,
    pub icon: EventIcon,
    pub color: ThemeColor,
}

impl CustomEventType {
    /// Build a validated custom type. The label is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is malformed or built in, or the label is
    /// empty or too long.
    pub fn new(
        key: &str,
        label: &str,
        icon: EventIcon,
        color: ThemeColor,
    ) -> Result<Self, EventTypeError> {
        validate_key(key)?;
        if BuiltinEventType::from_key(key).is_some() {
            return Err(EventTypeError::Builtin(key.to_owned()));
        }

        let label = label.trim();
        if label.is_empty() || label.chars().count() > MAX_LABEL_LENGTH {
            return Err(EventTypeError::InvalidLabel);
        }

        Ok(Self {
            key: key.to_owned(),
            label: label.to_owned(),
            icon,
            color,
        })
    }
}

/// Check that a type key is well-formed.
///
/// # Errors
///
/// Returns `EventTypeError::InvalidKey` unless the key is 1-32 characters of
/// `[a-z0-9-]`.
pub fn validate_key(key: &str) -> Result<(), EventTypeError> {
    let well_formed = !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if well_formed {
        Ok(())
    } else {
        Err(EventTypeError::InvalidKey)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys_roundtrip() {
        for t in BuiltinEventType::ALL {
            assert_eq!(BuiltinEventType::from_key(t.key()), Some(t));
        }
        assert_eq!(BuiltinEventType::from_key("party"), None);
    }

    #[test]
    fn test_custom_type_valid() {
        let t = CustomEventType::new("graduation", "  Graduation ", EventIcon::GraduationCap, ThemeColor::Green)
            .unwrap();
        assert_eq!(t.label, "Graduation");
    }

    #[test]
    fn test_custom_type_rejects_builtin_key() {
        assert_eq!(
            CustomEventType::new("wedding", "Wedding 2", EventIcon::Heart, ThemeColor::Pink),
            Err(EventTypeError::Builtin("wedding".to_owned()))
        );
    }

    #[test]
    fn test_custom_type_rejects_bad_key_and_label() {
        assert_eq!(
            CustomEventType::new("Grad Party", "x", EventIcon::Star, ThemeColor::Red),
            Err(EventTypeError::InvalidKey)
        );
        assert_eq!(
            CustomEventType::new("grad", "   ", EventIcon::Star, ThemeColor::Red),
            Err(EventTypeError::InvalidLabel)
        );
        assert!(validate_key(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_icon_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&EventIcon::GraduationCap).unwrap(),
            "\"graduation_cap\""
        );
    }
}
