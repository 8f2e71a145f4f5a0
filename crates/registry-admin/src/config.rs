//! Configuration loaded from environment variables and command-line flags.

use std::env;

use device_registry::Database;

/// Default SQLite URL; the database keeps the bot's `iot_discord` name.
const DEFAULT_DATABASE_URL: &str = "sqlite:iot_discord.db?mode=rwc";

/// Registry connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite database URL.
    pub database_url: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pool_size: Database::DEFAULT_POOL_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DEVICE_REGISTRY_URL` | SQLite database URL | `sqlite:iot_discord.db?mode=rwc` |
    /// | `DEVICE_REGISTRY_POOL_SIZE` | Max pooled connections | `5` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DEVICE_REGISTRY_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let pool_size = match lookup("DEVICE_REGISTRY_POOL_SIZE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidPoolSize(raw)),
            },
            None => Database::DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            database_url,
            pool_size,
        })
    }

    /// Apply a `--database-url` flag over the environment.
    pub fn with_database_url(mut self, database_url: Option<&str>) -> Self {
        if let Some(url) = database_url {
            self.database_url = url.to_string();
        }
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DEVICE_REGISTRY_POOL_SIZE must be a positive integer, got {0:?}")]
    InvalidPoolSize(String),
}
