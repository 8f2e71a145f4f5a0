//! SQLite registry of Discord users bound to Tuya smart switches.
//!
//! A binding records that a Discord user registered a device, and which
//! message and channel hold that device's control panel. The bot checks the
//! registry before forwarding any control command to the Tuya cloud.
//!
//! # Example
//!
//! ```no_run
//! use device_registry::{Database, DeviceRegistry, SqliteRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:iot_discord.db?mode=rwc").await?;
//!     db.migrate().await?;
//!     let registry = SqliteRegistry::new(db);
//!
//!     // Register switch-01 for user 100 from message 555 in channel 777
//!     registry.upsert("switch-01", 100, 555, 777).await?;
//!     assert!(registry.is_authorized("switch-01", 100).await?);
//!
//!     Ok(())
//! }
//! ```

pub mod binding;
pub mod error;
pub mod memory;
pub mod models;
pub mod store;
pub mod validation;

pub use error::{RegistryError, Result};
pub use memory::MemoryRegistry;
pub use models::DeviceBinding;
pub use store::{DeviceRegistry, SqliteRegistry};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 5;

    /// Connect to a SQLite database with the default pool size.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> device_registry::Result<()> {
    /// // File database
    /// let db = device_registry::Database::connect("sqlite:iot_discord.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = device_registry::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Connected to device registry");

        Ok(Self { pool })
    }

    /// Create the `device_info_view` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running device registry migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
