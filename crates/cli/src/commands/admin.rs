//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin user
//! cd-cli admin create -e admin@example.com -n "Admin Name" -p 'a long passphrase'
//!
//! # Reset a password
//! COUNTDOWN_ADMIN_PASSWORD='new passphrase' cd-cli admin set-password -e admin@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `COUNTDOWN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `COUNTDOWN_ADMIN_PASSWORD` - Password, when `--password` is omitted

use thiserror::Error;

use countdown_server::models::User;
use countdown_server::services::auth::{AuthError, AuthService};

use super::{ConnectError, connect};

/// Errors that can occur during user management.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Could not connect.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// The auth service rejected the operation.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error if the email is taken, the input is invalid, or the
/// database is unreachable.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<User, AdminError> {
    let pool = connect().await?;

    tracing::info!("Creating admin user: {}", email);
    let user = AuthService::new(&pool)
        .create_user(email, password, name, true)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user)
}

/// Replace a user's password.
///
/// # Errors
///
/// Returns an error if no such user exists, the password is too weak, or
/// the database is unreachable.
pub async fn set_password(email: &str, password: &str) -> Result<User, AdminError> {
    let pool = connect().await?;

    let user = AuthService::new(&pool).set_password(email, password).await?;
    tracing::info!("Password updated for {}", user.email);
    Ok(user)
}
