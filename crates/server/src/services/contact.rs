//! Contact form submissions.

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use countdown_core::{Email, EmailError, MessageCategory};

use crate::db::RepositoryError;
use crate::db::messages::{ContactFields, MessageRepository};
use crate::models::{ContactMessage, NewContactMessage};

const MAX_NAME_LENGTH: usize = 100;
const MAX_SUBJECT_LENGTH: usize = 200;
const MAX_MESSAGE_LENGTH: usize = 5000;

/// Errors from contact form submission.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

fn required(value: &str, field: &str, max: usize) -> Result<String, ContactError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ContactError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(ContactError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_owned())
}

/// Validate a contact form. Unknown categories fall back to `general`.
///
/// # Errors
///
/// Returns `ContactError::Validation` or `ContactError::InvalidEmail`.
pub fn validate_contact(input: &NewContactMessage) -> Result<ContactFields, ContactError> {
    Ok(ContactFields {
        name: required(&input.name, "name", MAX_NAME_LENGTH)?,
        email: Email::parse(&input.email)?,
        subject: required(&input.subject, "subject", MAX_SUBJECT_LENGTH)?,
        category: input
            .category
            .as_deref()
            .map(MessageCategory::parse_lenient)
            .unwrap_or_default(),
        message: required(&input.message, "message", MAX_MESSAGE_LENGTH)?,
    })
}

/// Validate and store a contact form submission.
///
/// # Errors
///
/// Returns a validation error or `ContactError::Repository`.
pub async fn submit(pool: &PgPool, input: &NewContactMessage) -> Result<ContactMessage, ContactError> {
    let fields = validate_contact(input)?;
    let message = MessageRepository::new(pool).create(&fields).await?;
    info!(message_id = %message.id, category = %message.category, "Contact message received");
    Ok(message)
}
