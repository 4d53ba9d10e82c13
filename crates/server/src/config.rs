//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `COUNTDOWN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `COUNTDOWN_BASE_URL` - Public URL used in share links and meta tags
//!
//! ## Optional
//! - `COUNTDOWN_HOST` - Bind address (default: 127.0.0.1)
//! - `COUNTDOWN_PORT` - Listen port (default: 3000)
//! - `COUNTDOWN_BOOTSTRAP_ADMIN_EMAIL` - Admin created on first start when no users exist
//! - `COUNTDOWN_BOOTSTRAP_ADMIN_PASSWORD` - Password for the bootstrap admin (min 12 chars, high entropy)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (default: development)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for human-readable output

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use countdown_core::Email;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_BOOTSTRAP_PASSWORD_LENGTH: usize = 12;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "admin123",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, without trailing slash
    pub base_url: String,
    /// Admin account created when the user table is empty
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: String,
    /// Emit JSON logs
    pub log_json: bool,
}

/// Credentials for the bootstrap admin.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: Email,
    pub password: SecretString,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the bootstrap admin password fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("COUNTDOWN_DATABASE_URL")?;
        let host = get_env_or_default("COUNTDOWN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("COUNTDOWN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("COUNTDOWN_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("COUNTDOWN_PORT".to_string(), e.to_string()))?;
        let base_url = parse_base_url(&get_required_env("COUNTDOWN_BASE_URL")?)?;

        let bootstrap_admin = BootstrapAdmin::from_parts(
            get_optional_env("COUNTDOWN_BOOTSTRAP_ADMIN_EMAIL"),
            get_optional_env("COUNTDOWN_BOOTSTRAP_ADMIN_PASSWORD"),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            bootstrap_admin,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_env_or_default("SENTRY_ENVIRONMENT", "development"),
            log_json: get_optional_env("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BootstrapAdmin {
    /// Build from the optional email/password pair. Both or neither must be set.
    fn from_parts(email: Option<String>, password: Option<String>) -> Result<Option<Self>, ConfigError> {
        match (email, password) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "COUNTDOWN_BOOTSTRAP_ADMIN_PASSWORD".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(
                "COUNTDOWN_BOOTSTRAP_ADMIN_EMAIL".to_string(),
            )),
            (Some(email), Some(password)) => {
                let email = Email::parse(&email).map_err(|e| {
                    ConfigError::InvalidEnvVar("COUNTDOWN_BOOTSTRAP_ADMIN_EMAIL".to_string(), e.to_string())
                })?;
                let password = SecretString::from(password);
                validate_password_length(&password, "COUNTDOWN_BOOTSTRAP_ADMIN_PASSWORD")?;
                validate_secret_strength(password.expose_secret(), "COUNTDOWN_BOOTSTRAP_ADMIN_PASSWORD")?;
                Ok(Some(Self { email, password }))
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate the public base URL and strip any trailing slash.
fn parse_base_url(value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("COUNTDOWN_BASE_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "COUNTDOWN_BASE_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Validate that a password meets minimum length requirements.
fn validate_password_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let len = secret.expose_secret().chars().count();
    if len < MIN_BOOTSTRAP_PASSWORD_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_BOOTSTRAP_PASSWORD_LENGTH} characters (got {len})"),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated password."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            bootstrap_admin: None,
            sentry_dsn: None,
            sentry_environment: "test".to_string(),
            log_json: false,
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength() {
        assert!(matches!(
            validate_secret_strength("changeme123456", "TEST_VAR"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
        assert!(matches!(
            validate_secret_strength("MyPassword-2026!", "TEST_VAR"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaa", "TEST_VAR").is_err());
        assert!(validate_secret_strength("t7#Qm2!vLz9@Rw4k", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_bootstrap_admin_requires_both_parts() {
        assert!(BootstrapAdmin::from_parts(None, None).unwrap().is_none());
        assert!(matches!(
            BootstrapAdmin::from_parts(Some("admin@countdown.test".into()), None),
            Err(ConfigError::MissingEnvVar(_))
        ));
        assert!(matches!(
            BootstrapAdmin::from_parts(None, Some("t7#Qm2!vLz9@Rw4k".into())),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_bootstrap_admin_validates_credentials() {
        assert!(matches!(
            BootstrapAdmin::from_parts(Some("not-an-email".into()), Some("t7#Qm2!vLz9@Rw4k".into())),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            BootstrapAdmin::from_parts(Some("admin@countdown.test".into()), Some("Sh0rt!".into())),
            Err(ConfigError::InsecureSecret(_, _))
        ));

        let admin = BootstrapAdmin::from_parts(
            Some(" Admin@Countdown.test ".into()),
            Some("t7#Qm2!vLz9@Rw4k".into()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(admin.email.as_str(), "admin@countdown.test");
    }

    #[test]
    fn test_bootstrap_admin_debug_redacts_password() {
        let admin = BootstrapAdmin {
            email: Email::parse("admin@countdown.test").unwrap(),
            password: SecretString::from("super_secret_value"),
        };
        let debug_output = format!("{admin:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_value"));
    }

    #[test]
    fn test_parse_base_url() {
        assert_eq!(
            parse_base_url("https://countdown.test/").unwrap(),
            "https://countdown.test"
        );
        assert!(parse_base_url("countdown.test").is_err());
        assert!(parse_base_url("ftp://countdown.test").is_err());
    }

    #[test]
    fn test_socket_addr_and_cookies() {
        let mut config = config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.secure_cookies());

        config.base_url = "https://countdown.test".to_string();
        assert!(config.secure_cookies());
    }
}
