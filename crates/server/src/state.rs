//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use countdown_core::SystemSettings;

use crate::config::ServerConfig;
use crate::db::RepositoryError;
use crate::services::settings::SettingsService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    settings: SettingsService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                settings: SettingsService::new(),
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the settings service.
    #[must_use]
    pub fn settings_service(&self) -> &SettingsService {
        &self.inner.settings
    }

    /// Current system settings (cached).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the settings cannot be loaded.
    pub async fn settings(&self) -> Result<SystemSettings, RepositoryError> {
        self.inner.settings.get(&self.inner.pool).await
    }
}
