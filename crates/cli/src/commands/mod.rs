//! CLI command implementations.

pub mod admin;
pub mod export;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;

/// Database URL from `COUNTDOWN_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("COUNTDOWN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}

/// Connect to the database named by the environment.
async fn connect() -> Result<PgPool, ConnectError> {
    let url = database_url().ok_or(ConnectError::MissingEnvVar("COUNTDOWN_DATABASE_URL"))?;
    tracing::info!("Connecting to database...");
    Ok(countdown_server::db::create_pool(&url).await?)
}

/// Errors establishing the database connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
