//! Cached access to system settings.
//!
//! Settings are read on nearly every request (maintenance mode, event type
//! labels), so the decoded document is cached in memory for a minute.
//! Writers invalidate it once their transaction commits.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use countdown_core::SystemSettings;

use crate::db::{RepositoryError, SettingsRepository};

const CACHE_KEY: &str = "system";
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Settings reader/writer with a short-lived in-memory cache.
#[derive(Clone)]
pub struct SettingsService {
    cache: Cache<&'static str, SystemSettings>,
}

impl Default for SettingsService {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsService {
    /// Create a service with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// Current settings, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the settings cannot be loaded.
    pub async fn get(&self, pool: &PgPool) -> Result<SystemSettings, RepositoryError> {
        if let Some(settings) = self.cache.get(CACHE_KEY).await {
            debug!("Cache hit for system settings");
            return Ok(settings);
        }

        let settings = SettingsRepository::new(pool).load_system().await?;
        self.cache.insert(CACHE_KEY, settings.clone()).await;
        Ok(settings)
    }

    /// Drop the cached copy so the next read hits the database.
    pub async fn invalidate(&self) {
        self.cache.invalidate(CACHE_KEY).await;
    }

    /// Seed the cache directly.
    #[cfg(test)]
    pub async fn prime(&self, settings: SystemSettings) {
        self.cache.insert(CACHE_KEY, settings).await;
    }
}
