//! Event validation and lifecycle.
//!
//! Every event write goes through this service. It owns the title,
//! description, event type, date and image rules along with per-user
//! limits, ownership checks and optimistic concurrency.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use countdown_core::image::{ImageError, validate_background_image};
use countdown_core::{Email, EmailError, EventId, SystemSettings, UserId};

use crate::db::RepositoryError;
use crate::db::events::{EventFields, EventRepository};
use crate::db::join_requests::{JoinRequestFields, JoinRequestRepository};
use crate::db::users::UserRepository;
use crate::models::{CountdownEvent, EventInput, JoinRequest, NewJoinRequest};

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 120;
/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;
/// Maximum join request name length.
const MAX_JOIN_NAME_LENGTH: usize = 100;
/// Maximum join request phone length.
const MAX_JOIN_PHONE_LENGTH: usize = 40;
/// Maximum join request message length.
const MAX_JOIN_MESSAGE_LENGTH: usize = 1000;

/// Errors from event operations.
#[derive(Debug, Error)]
pub enum EventError {
    /// A field failed validation.
    #[error("{0}")]
    Validation(String),

    /// A background image failed validation.
    #[error("invalid {field}: {source}")]
    Image {
        field: &'static str,
        #[source]
        source: ImageError,
    },

    /// Join form email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The user already owns the maximum number of events.
    #[error("you can create at most {max} events")]
    LimitReached { max: u32 },

    /// The event does not exist.
    #[error("event not found")]
    NotFound,

    /// The caller neither owns the event nor is an admin.
    #[error("you do not have permission to modify this event")]
    Forbidden,

    /// The event does not accept join requests.
    #[error("this event is not accepting join requests")]
    JoinClosed,

    /// Someone else saved the event first.
    #[error("{0}")]
    Conflict(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for EventError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Repository(other),
        }
    }
}

/// Normalize optional free text: trimmed, empty becomes `None`.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Validate an optional image field, returning the value to store.
fn checked_image(
    value: Option<&str>,
    field: &'static str,
    max_bytes: usize,
) -> Result<Option<String>, EventError> {
    non_empty(value)
        .map(|image| {
            validate_background_image(&image, max_bytes)
                .map(|checked| checked.into_stored(&image))
                .map_err(|source| EventError::Image { field, source })
        })
        .transpose()
}

/// Validate a create/edit payload against the current settings.
///
/// `previous` is the stored event when editing; its date is the only one
/// allowed to be in the past, so an event that has already started can
/// still be edited without moving it.
///
/// # Errors
///
/// Returns `EventError::Validation` or `EventError::Image` on the first
/// violated rule.
pub fn validate_event(
    input: &EventInput,
    settings: &SystemSettings,
    previous: Option<&CountdownEvent>,
    now: DateTime<Utc>,
) -> Result<EventFields, EventError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(EventError::Validation("title is required".to_owned()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(EventError::Validation(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }

    let description = non_empty(input.description.as_deref());
    if description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
    {
        return Err(EventError::Validation(format!(
            "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }

    let event_type = input.event_type.trim();
    let type_unchanged = previous.is_some_and(|p| p.event_type == event_type);
    if !type_unchanged && !settings.is_event_type_enabled(event_type) {
        return Err(EventError::Validation(format!(
            "event type '{event_type}' is not available"
        )));
    }

    let date_unchanged = previous.is_some_and(|p| p.event_date == input.event_date);
    if !date_unchanged && input.event_date <= now {
        return Err(EventError::Validation(
            "event date must be in the future".to_owned(),
        ));
    }

    let max_bytes = settings.max_image_bytes();
    let background_image =
        checked_image(input.background_image.as_deref(), "background image", max_bytes)?;
    let mobile_background_image = checked_image(
        input.mobile_background_image.as_deref(),
        "mobile background image",
        max_bytes,
    )?;

    Ok(EventFields {
        title: title.to_owned(),
        description,
        event_date: input.event_date,
        event_type: event_type.to_owned(),
        background_image,
        mobile_background_image,
        is_public: input.is_public,
        allow_join: input.allow_join,
    })
}

/// Validate a join form.
///
/// # Errors
///
/// Returns `EventError::Validation` or `EventError::InvalidEmail`.
pub fn validate_join(input: &NewJoinRequest) -> Result<JoinRequestFields, EventError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(EventError::Validation("name is required".to_owned()));
    }
    if name.chars().count() > MAX_JOIN_NAME_LENGTH {
        return Err(EventError::Validation(format!(
            "name must be at most {MAX_JOIN_NAME_LENGTH} characters"
        )));
    }
    let email = Email::parse(&input.email)?;

    let phone = non_empty(input.phone.as_deref());
    if phone
        .as_ref()
        .is_some_and(|p| p.chars().count() > MAX_JOIN_PHONE_LENGTH)
    {
        return Err(EventError::Validation(format!(
            "phone must be at most {MAX_JOIN_PHONE_LENGTH} characters"
        )));
    }
    let message = non_empty(input.message.as_deref());
    if message
        .as_ref()
        .is_some_and(|m| m.chars().count() > MAX_JOIN_MESSAGE_LENGTH)
    {
        return Err(EventError::Validation(format!(
            "message must be at most {MAX_JOIN_MESSAGE_LENGTH} characters"
        )));
    }

    Ok(JoinRequestFields {
        name: name.to_owned(),
        email,
        phone,
        message,
    })
}

/// Event lifecycle service.
pub struct EventService<'a> {
    pool: &'a PgPool,
    events: EventRepository<'a>,
}

impl<'a> EventService<'a> {
    /// Create a new event service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            events: EventRepository::new(pool),
        }
    }

    /// Load an event.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotFound` if it doesn't exist.
    pub async fn get(&self, id: &EventId) -> Result<CountdownEvent, EventError> {
        self.events.get_by_id(id).await?.ok_or(EventError::NotFound)
    }

    /// Create an event owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `EventError::LimitReached` if a non-admin owner is at the limit,
    /// or any validation error.
    pub async fn create(
        &self,
        owner: UserId,
        input: &EventInput,
        settings: &SystemSettings,
        now: DateTime<Utc>,
    ) -> Result<CountdownEvent, EventError> {
        let fields = validate_event(input, settings, None, now)?;

        if !self.is_admin(owner).await? {
            let owned = self.events.count_for_user(owner).await?;
            if owned >= i64::from(settings.max_events_per_user) {
                return Err(EventError::LimitReached {
                    max: settings.max_events_per_user,
                });
            }
        }

        let event = self.events.insert(Some(owner), &fields).await?;
        info!(event_id = %event.id, user_id = %owner, "Event created");
        Ok(event)
    }

    /// Overwrite an event the caller owns (or any event, for admins).
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotFound`, `EventError::Forbidden`,
    /// `EventError::Conflict` on a stale version, or any validation error.
    pub async fn update(
        &self,
        actor: UserId,
        id: &EventId,
        input: &EventInput,
        settings: &SystemSettings,
        now: DateTime<Utc>,
    ) -> Result<CountdownEvent, EventError> {
        let current = self.get(id).await?;
        self.ensure_can_modify(actor, &current).await?;

        let expected_version = input
            .version
            .ok_or_else(|| EventError::Validation("version is required".to_owned()))?;
        let fields = validate_event(input, settings, Some(&current), now)?;

        let event = self.events.update(id, expected_version, &fields).await?;
        info!(event_id = %event.id, version = event.version, "Event updated");
        Ok(event)
    }

    /// Delete an event the caller owns (or any event, for admins).
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotFound` or `EventError::Forbidden`.
    pub async fn delete(&self, actor: UserId, id: &EventId) -> Result<(), EventError> {
        let current = self.get(id).await?;
        self.ensure_can_modify(actor, &current).await?;

        if !self.events.delete(id).await? {
            return Err(EventError::NotFound);
        }
        info!(event_id = %id, user_id = %actor, "Event deleted");
        Ok(())
    }

    /// Record a visitor's join request.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotFound`, `EventError::JoinClosed`, or a
    /// validation error.
    pub async fn join(&self, id: &EventId, input: &NewJoinRequest) -> Result<JoinRequest, EventError> {
        let event = self.get(id).await?;
        if !event.allow_join {
            return Err(EventError::JoinClosed);
        }
        let fields = validate_join(input)?;

        let request = JoinRequestRepository::new(self.pool)
            .create(&event, &fields)
            .await?;
        info!(event_id = %event.id, join_request_id = %request.id, "Join request received");
        Ok(request)
    }

    async fn ensure_can_modify(&self, actor: UserId, event: &CountdownEvent) -> Result<(), EventError> {
        if event.is_owned_by(actor) || self.is_admin(actor).await? {
            Ok(())
        } else {
            Err(EventError::Forbidden)
        }
    }

    async fn is_admin(&self, user_id: UserId) -> Result<bool, EventError> {
        Ok(UserRepository::new(self.pool)
            .is_admin(user_id)
            .await?
            .unwrap_or(false))
    }
}
