//! Status and category enums for messages and the admin log.

use serde::{Deserialize, Serialize};

/// Contact message category chosen on the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    #[default]
    General,
    Support,
    Feedback,
    Bug,
    Partnership,
}

impl MessageCategory {
    /// Parse a category, falling back to `General` for unknown input.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        s.trim().to_lowercase().parse().unwrap_or_default()
    }

    /// The stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Support => "support",
            Self::Feedback => "feedback",
            Self::Bug => "bug",
            Self::Partnership => "partnership",
        }
    }
}

impl std::fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Self::General),
            "support" => Ok(Self::Support),
            "feedback" => Ok(Self::Feedback),
            "bug" => Ok(Self::Bug),
            "partnership" => Ok(Self::Partnership),
            _ => Err(format!("invalid message category: {s}")),
        }
    }
}

/// Inbox filter for the admin message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageFilter {
    /// Every message that is not archived.
    #[default]
    All,
    /// Unread, non-archived messages.
    Unread,
    /// Archived messages only.
    Archived,
}

/// Kind of admin mutation recorded in the admin log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    UserDeleted,
    UserAdminChanged,
    EventDeleted,
    EventVisibilityChanged,
    MessageDeleted,
    MessageStatusChanged,
    MessageReplied,
    SettingsUpdated,
    EventTypeAdded,
    EventTypeRemoved,
    LogsCleared,
}

impl AdminAction {
    /// The stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserDeleted => "user_deleted",
            Self::UserAdminChanged => "user_admin_changed",
            Self::EventDeleted => "event_deleted",
            Self::EventVisibilityChanged => "event_visibility_changed",
            Self::MessageDeleted => "message_deleted",
            Self::MessageStatusChanged => "message_status_changed",
            Self::MessageReplied => "message_replied",
            Self::SettingsUpdated => "settings_updated",
            Self::EventTypeAdded => "event_type_added",
            Self::EventTypeRemoved => "event_type_removed",
            Self::LogsCleared => "logs_cleared",
        }
    }
}

impl std::fmt::Display for AdminAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lenient_parse() {
        assert_eq!(MessageCategory::parse_lenient(" Support "), MessageCategory::Support);
        assert_eq!(MessageCategory::parse_lenient("spam"), MessageCategory::General);
        assert_eq!(MessageCategory::parse_lenient(""), MessageCategory::General);
    }

    #[test]
    fn test_category_display_matches_parse() {
        for c in [
            MessageCategory::General,
            MessageCategory::Support,
            MessageCategory::Feedback,
            MessageCategory::Bug,
            MessageCategory::Partnership,
        ] {
            assert_eq!(c.to_string().parse::<MessageCategory>(), Ok(c));
        }
    }

    #[test]
    fn test_admin_action_display() {
        assert_eq!(AdminAction::UserDeleted.to_string(), "user_deleted");
        assert_eq!(AdminAction::LogsCleared.as_str(), "logs_cleared");
    }
}
