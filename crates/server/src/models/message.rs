//! Contact message domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use countdown_core::{Email, MessageCategory, MessageId, MessageReplyId};

/// A message submitted through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub id: MessageId,
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub category: MessageCategory,
    pub message: String,
    pub is_read: bool,
    pub is_archived: bool,
    pub received_at: DateTime<Utc>,
}

/// Contact form payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    #[serde(default)]
    pub category: Option<String>,
    pub message: String,
}

/// An admin reply to a contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MessageReply {
    pub id: MessageReplyId,
    pub message_id: MessageId,
    pub subject: String,
    pub body: String,
    pub replied_at: DateTime<Utc>,
}
