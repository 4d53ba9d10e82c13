//! Domain models for the countdown server.
//!
//! Row types double as domain types: every model derives `sqlx::FromRow`
//! and decodes its validated newtypes (`EventId`, `Email`, `UserId`)
//! directly from the column values.

pub mod admin_log;
pub mod event;
pub mod join_request;
pub mod message;
pub mod session;
pub mod user;

pub use admin_log::AdminLog;
pub use event::{CountdownEvent, EventInput, EventWithCountdown};
pub use join_request::{JoinRequest, NewJoinRequest};
pub use message::{ContactMessage, MessageReply, NewContactMessage};
pub use session::CurrentUser;
pub use user::User;
