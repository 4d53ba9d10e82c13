//! Database operations for the countdown `PostgreSQL` schema.
//!
//! # Schema: `countdown`
//!
//! ## Tables
//!
//! - `app_user` - Registered users (unique lowercase email)
//! - `user_password` - Argon2 password hashes, one per user
//! - `event` - Countdown events with an optimistic-concurrency `version`
//! - `join_request` - Visitor join requests, cascaded on event delete
//! - `contact_message` / `message_reply` - Contact inbox and admin replies
//! - `setting` - JSONB settings documents
//! - `admin_log` - Capped admin activity log
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p countdown-cli -- migrate
//! ```
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database.

pub mod admin_logs;
pub mod events;
pub mod join_requests;
pub mod messages;
pub mod settings;
pub mod stats;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_logs::AdminLogRepository;
pub use events::EventRepository;
pub use join_requests::JoinRequestRepository;
pub use messages::MessageRepository;
pub use settings::SettingsRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation or stale write (e.g., unique email, old version).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_unique_violation(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
