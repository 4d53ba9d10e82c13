//! Admin console operations.
//!
//! Every mutation here appends an entry to the admin log in the same
//! transaction as the change itself.

use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::info;

use countdown_core::links::mailto;
use countdown_core::settings::MAX_IMAGE_SIZE_MB;
use countdown_core::{
    AdminAction, CustomEventType, EventId, EventTypeError, MessageId, SystemSettings, UserId,
};

use crate::db::{
    AdminLogRepository, EventRepository, MessageRepository, RepositoryError, SettingsRepository,
    UserRepository,
};
use crate::models::{ContactMessage, CountdownEvent, MessageReply, User};
use crate::services::settings::SettingsService;

/// Maximum reply subject length.
const MAX_REPLY_SUBJECT_LENGTH: usize = 200;
/// Maximum reply body length.
const MAX_REPLY_BODY_LENGTH: usize = 10_000;

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The target does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// An admin tried to delete their own account.
    #[error("you cannot delete your own account")]
    CannotDeleteSelf,

    /// An admin tried to revoke their own admin flag.
    #[error("you cannot remove your own admin access")]
    CannotDemoteSelf,

    /// Settings or an event type failed validation.
    #[error("{0}")]
    Validation(String),

    /// Custom event type rejected.
    #[error(transparent)]
    EventType(#[from] EventTypeError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Map a repository `NotFound` to a named admin `NotFound`.
fn not_found(what: &'static str) -> impl FnOnce(RepositoryError) -> AdminError {
    move |e| match e {
        RepositoryError::NotFound => AdminError::NotFound(what),
        other => AdminError::Repository(other),
    }
}

/// Outcome of replying to a contact message.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReplyOutcome {
    pub reply: MessageReply,
    /// `mailto:` link that opens the reply in the admin's mail client.
    pub mailto: String,
}

/// Admin operations service.
pub struct AdminService<'a> {
    pool: &'a PgPool,
    settings: &'a SettingsService,
}

impl<'a> AdminService<'a> {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, settings: &'a SettingsService) -> Self {
        Self { pool, settings }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, AdminError> {
        Ok(self.pool.begin().await.map_err(RepositoryError::from)?)
    }

    /// Append the log entry and commit the mutation's transaction.
    async fn commit_logged(
        mut tx: Transaction<'static, Postgres>,
        action: AdminAction,
        description: &str,
    ) -> Result<(), AdminError> {
        AdminLogRepository::record_in(&mut tx, action, description).await?;
        tx.commit().await.map_err(RepositoryError::from)?;
        info!(action = %action, description, "Admin action");
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Delete a user and everything they own.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::CannotDeleteSelf` or `AdminError::NotFound`.
    pub async fn delete_user(&self, actor: UserId, target: UserId) -> Result<User, AdminError> {
        if actor == target {
            return Err(AdminError::CannotDeleteSelf);
        }

        let mut tx = self.begin().await?;
        let user = UserRepository::delete_in(&mut tx, target)
            .await?
            .ok_or(AdminError::NotFound("user"))?;
        let description = format!("Deleted user {} ({})", user.name, user.email);
        Self::commit_logged(tx, AdminAction::UserDeleted, &description).await?;
        Ok(user)
    }

    /// Grant or revoke admin access.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::CannotDemoteSelf` or `AdminError::NotFound`.
    pub async fn set_user_admin(
        &self,
        actor: UserId,
        target: UserId,
        is_admin: bool,
    ) -> Result<User, AdminError> {
        if actor == target && !is_admin {
            return Err(AdminError::CannotDemoteSelf);
        }

        let mut tx = self.begin().await?;
        let user = UserRepository::set_admin_in(&mut tx, target, is_admin)
            .await
            .map_err(not_found("user"))?;
        let verb = if is_admin { "Granted" } else { "Revoked" };
        let description = format!("{verb} admin access for {}", user.email);
        Self::commit_logged(tx, AdminAction::UserAdminChanged, &description).await?;
        Ok(user)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Delete any event.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the event doesn't exist.
    pub async fn delete_event(&self, id: &EventId) -> Result<(), AdminError> {
        let event = EventRepository::new(self.pool)
            .get_by_id(id)
            .await?
            .ok_or(AdminError::NotFound("event"))?;

        let mut tx = self.begin().await?;
        if !EventRepository::delete_in(&mut tx, id).await? {
            return Err(AdminError::NotFound("event"));
        }
        let description = format!("Deleted event \"{}\" ({id})", event.title);
        Self::commit_logged(tx, AdminAction::EventDeleted, &description).await
    }

    /// Show or hide any event in the public gallery.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the event doesn't exist.
    pub async fn set_event_visibility(
        &self,
        id: &EventId,
        is_public: bool,
    ) -> Result<CountdownEvent, AdminError> {
        let mut tx = self.begin().await?;
        let event = EventRepository::set_visibility_in(&mut tx, id, is_public)
            .await
            .map_err(not_found("event"))?;
        let visibility = if is_public { "public" } else { "private" };
        let description = format!("Made event \"{}\" {visibility}", event.title);
        Self::commit_logged(tx, AdminAction::EventVisibilityChanged, &description).await?;
        Ok(event)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Mark a message read or unread.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the message doesn't exist.
    pub async fn set_message_read(&self, id: MessageId, is_read: bool) -> Result<ContactMessage, AdminError> {
        let mut tx = self.begin().await?;
        let message = MessageRepository::set_read_in(&mut tx, id, is_read)
            .await
            .map_err(not_found("message"))?;
        let state = if is_read { "read" } else { "unread" };
        let description = format!("Marked message \"{}\" as {state}", message.subject);
        Self::commit_logged(tx, AdminAction::MessageStatusChanged, &description).await?;
        Ok(message)
    }

    /// Archive or unarchive a message.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the message doesn't exist.
    pub async fn set_message_archived(
        &self,
        id: MessageId,
        is_archived: bool,
    ) -> Result<ContactMessage, AdminError> {
        let mut tx = self.begin().await?;
        let message = MessageRepository::set_archived_in(&mut tx, id, is_archived)
            .await
            .map_err(not_found("message"))?;
        let verb = if is_archived { "Archived" } else { "Unarchived" };
        let description = format!("{verb} message \"{}\"", message.subject);
        Self::commit_logged(tx, AdminAction::MessageStatusChanged, &description).await?;
        Ok(message)
    }

    /// Delete a message and its replies.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the message doesn't exist.
    pub async fn delete_message(&self, id: MessageId) -> Result<(), AdminError> {
        let mut tx = self.begin().await?;
        let message = MessageRepository::delete_in(&mut tx, id)
            .await?
            .ok_or(AdminError::NotFound("message"))?;
        let description = format!("Deleted message \"{}\" from {}", message.subject, message.email);
        Self::commit_logged(tx, AdminAction::MessageDeleted, &description).await
    }

    /// Store a reply, mark the message read, and build the `mailto:` link.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` for an empty or oversized reply, or
    /// `AdminError::NotFound` if the message doesn't exist.
    pub async fn reply_to_message(
        &self,
        id: MessageId,
        subject: &str,
        body: &str,
    ) -> Result<ReplyOutcome, AdminError> {
        let subject = subject.trim();
        let body = body.trim();
        if subject.is_empty() || body.is_empty() {
            return Err(AdminError::Validation("subject and body are required".to_owned()));
        }
        if subject.chars().count() > MAX_REPLY_SUBJECT_LENGTH
            || body.chars().count() > MAX_REPLY_BODY_LENGTH
        {
            return Err(AdminError::Validation("reply is too long".to_owned()));
        }

        let message = MessageRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(AdminError::NotFound("message"))?;

        let mut tx = self.begin().await?;
        let reply = MessageRepository::add_reply_in(&mut tx, id, subject, body)
            .await
            .map_err(not_found("message"))?;
        let description = format!("Replied to {} about \"{}\"", message.email, message.subject);
        Self::commit_logged(tx, AdminAction::MessageReplied, &description).await?;

        Ok(ReplyOutcome {
            mailto: mailto(message.email.as_str(), subject, body),
            reply,
        })
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Replace the system settings.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` for an unusable configuration.
    pub async fn update_settings(&self, settings: SystemSettings) -> Result<SystemSettings, AdminError> {
        validate_settings(&settings)?;
        self.save_settings(settings, AdminAction::SettingsUpdated, "Updated system settings")
            .await
    }

    /// Add a custom event type.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::EventType` if the key is taken.
    pub async fn add_event_type(&self, event_type: CustomEventType) -> Result<SystemSettings, AdminError> {
        let mut settings = self.settings.get(self.pool).await?;
        let description = format!("Added event type \"{}\" ({})", event_type.label, event_type.key);
        settings.add_custom_event_type(event_type)?;
        self.save_settings(settings, AdminAction::EventTypeAdded, &description)
            .await
    }

    /// Remove a custom event type. Events already using it keep their key.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if no custom type has this key.
    pub async fn remove_event_type(&self, key: &str) -> Result<SystemSettings, AdminError> {
        let mut settings = self.settings.get(self.pool).await?;
        if !settings.remove_custom_event_type(key) {
            return Err(AdminError::NotFound("event type"));
        }
        self.save_settings(settings, AdminAction::EventTypeRemoved, &format!("Removed event type {key}"))
            .await
    }

    async fn save_settings(
        &self,
        settings: SystemSettings,
        action: AdminAction,
        description: &str,
    ) -> Result<SystemSettings, AdminError> {
        let settings = settings.normalized();
        let mut tx = self.begin().await?;
        SettingsRepository::save_system_in(&mut tx, &settings).await?;
        Self::commit_logged(tx, action, description).await?;
        self.settings.invalidate().await;
        Ok(settings)
    }

    // =========================================================================
    // Logs
    // =========================================================================

    /// Clear the admin log, leaving a single entry recording the wipe.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Repository` if a query fails.
    pub async fn clear_logs(&self) -> Result<u64, AdminError> {
        let mut tx = self.begin().await?;
        let removed = AdminLogRepository::clear_in(&mut tx).await?;
        Self::commit_logged(tx, AdminAction::LogsCleared, &format!("Cleared {removed} log entries"))
            .await?;
        Ok(removed)
    }
}

/// Check settings an admin submits before saving them.
fn validate_settings(settings: &SystemSettings) -> Result<(), AdminError> {
    if settings.site_name.trim().is_empty() {
        return Err(AdminError::Validation("site name is required".to_owned()));
    }
    if !(1..=MAX_IMAGE_SIZE_MB).contains(&settings.max_image_size) {
        return Err(AdminError::Validation(format!(
            "max image size must be between 1 and {MAX_IMAGE_SIZE_MB} MB"
        )));
    }
    if settings.max_events_per_user == 0 {
        return Err(AdminError::Validation(
            "max events per user must be at least 1".to_owned(),
        ));
    }

    let mut accepted = SystemSettings {
        custom_event_types: Vec::new(),
        ..SystemSettings::default()
    };
    for custom in &settings.custom_event_types {
        let checked = CustomEventType::new(&custom.key, &custom.label, custom.icon, custom.color)?;
        accepted.add_custom_event_type(checked)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use countdown_core::{EventIcon, ThemeColor};

    use super::*;

    #[test]
    fn test_validate_settings() {
        assert!(validate_settings(&SystemSettings::default()).is_ok());

        let blank_name = SystemSettings {
            site_name: "  ".to_owned(),
            ..SystemSettings::default()
        };
        assert!(matches!(validate_settings(&blank_name), Err(AdminError::Validation(_))));

        let zero_images = SystemSettings {
            max_image_size: 0,
            ..SystemSettings::default()
        };
        assert!(validate_settings(&zero_images).is_err());

        let huge_images = SystemSettings {
            max_image_size: MAX_IMAGE_SIZE_MB + 1,
            ..SystemSettings::default()
        };
        assert!(matches!(validate_settings(&huge_images), Err(AdminError::Validation(_))));
    }

    fn custom(key: &str) -> CustomEventType {
        CustomEventType {
            key: key.to_owned(),
            label: "Party".to_owned(),
            icon: EventIcon::Star,
            color: ThemeColor::Blue,
        }
    }

    #[test]
    fn test_validate_settings_rejects_duplicate_custom_keys() {
        let settings = SystemSettings {
            custom_event_types: vec![custom("party"), custom("party")],
            ..SystemSettings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(AdminError::EventType(EventTypeError::Duplicate(key))) if key == "party"
        ));
    }

    #[test]
    fn test_validate_settings_rejects_builtin_custom_key() {
        let settings = SystemSettings {
            custom_event_types: vec![custom("wedding")],
            ..SystemSettings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(AdminError::EventType(EventTypeError::Builtin(_)))
        ));
    }

    #[test]
    fn test_validate_settings_rejects_bad_custom_type() {
        let settings = SystemSettings {
            custom_event_types: vec![CustomEventType {
                key: "Bad Key".to_owned(),
                label: "Bad".to_owned(),
                icon: EventIcon::Star,
                color: ThemeColor::Blue,
            }],
            ..SystemSettings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(AdminError::EventType(EventTypeError::InvalidKey))
        ));
    }

    #[test]
    fn test_not_found_mapping() {
        assert!(matches!(
            not_found("user")(RepositoryError::NotFound),
            AdminError::NotFound("user")
        ));
        assert!(matches!(
            not_found("user")(RepositoryError::Conflict("x".to_owned())),
            AdminError::Repository(_)
        ));
    }
}
