//! The registry interface and its SQLite implementation.

use async_trait::async_trait;

use crate::binding;
use crate::error::Result;
use crate::models::DeviceBinding;
use crate::Database;

/// Storage for device bindings.
///
/// The command handler asks this before forwarding any control command to
/// the Tuya cloud. This trait is object-safe and can be used with
/// `Arc<dyn DeviceRegistry>`.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Insert a binding, or replace the message and channel of the existing
    /// binding for the same device and author.
    async fn upsert(
        &self,
        device_id: &str,
        author_id: i64,
        message_id: i64,
        channel_id: i64,
    ) -> Result<DeviceBinding>;

    /// Get the binding for a device and author.
    ///
    /// Fails with `RegistryError::NotFound` when the author never registered
    /// the device.
    async fn lookup(&self, device_id: &str, author_id: i64) -> Result<DeviceBinding>;

    /// All authors who registered a device, ordered by author id.
    async fn list_by_device(&self, device_id: &str) -> Result<Vec<DeviceBinding>>;

    /// All devices an author registered, ordered by device id.
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<DeviceBinding>>;

    /// Delete a binding. Returns whether one existed; absence is not an error.
    async fn remove(&self, device_id: &str, author_id: i64) -> Result<bool>;

    /// Get the binding whose control panel lives in a message.
    async fn lookup_by_message(&self, message_id: i64) -> Result<DeviceBinding>;

    /// Delete the bindings posted from a message. Returns how many were removed.
    async fn remove_by_message(&self, message_id: i64) -> Result<u64>;

    /// Delete every binding for a device. Returns how many were removed.
    async fn remove_device(&self, device_id: &str) -> Result<u64>;

    /// Every binding, ordered by device id then author id.
    async fn list_all(&self) -> Result<Vec<DeviceBinding>>;

    /// Number of stored bindings.
    async fn count(&self) -> Result<i64>;

    /// Whether the author may operate the device.
    ///
    /// Storage failures propagate; a missing binding is `false`.
    async fn is_authorized(&self, device_id: &str, author_id: i64) -> Result<bool> {
        match self.lookup(device_id, author_id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Registry backed by the `device_info_view` table.
#[derive(Debug, Clone)]
pub struct SqliteRegistry {
    db: Database,
}

impl SqliteRegistry {
    /// Wrap a connected, migrated database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl DeviceRegistry for SqliteRegistry {
    async fn upsert(
        &self,
        device_id: &str,
        author_id: i64,
        message_id: i64,
        channel_id: i64,
    ) -> Result<DeviceBinding> {
        let binding = DeviceBinding::new(device_id, author_id, message_id, channel_id);
        binding::upsert_binding(self.db.pool(), &binding).await
    }

    async fn lookup(&self, device_id: &str, author_id: i64) -> Result<DeviceBinding> {
        binding::get_binding(self.db.pool(), device_id, author_id).await
    }

    async fn list_by_device(&self, device_id: &str) -> Result<Vec<DeviceBinding>> {
        binding::list_by_device(self.db.pool(), device_id).await
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<DeviceBinding>> {
        binding::list_by_author(self.db.pool(), author_id).await
    }

    async fn remove(&self, device_id: &str, author_id: i64) -> Result<bool> {
        binding::delete_binding(self.db.pool(), device_id, author_id).await
    }

    async fn lookup_by_message(&self, message_id: i64) -> Result<DeviceBinding> {
        binding::get_binding_by_message(self.db.pool(), message_id).await
    }

    async fn remove_by_message(&self, message_id: i64) -> Result<u64> {
        binding::delete_by_message(self.db.pool(), message_id).await
    }

    async fn remove_device(&self, device_id: &str) -> Result<u64> {
        binding::delete_device(self.db.pool(), device_id).await
    }

    async fn list_all(&self) -> Result<Vec<DeviceBinding>> {
        binding::list_bindings(self.db.pool()).await
    }

    async fn count(&self) -> Result<i64> {
        binding::count_bindings(self.db.pool()).await
    }
}
