//! In-memory registry for tests and callers that do not need durability.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RegistryError, Result};
use crate::models::DeviceBinding;
use crate::store::DeviceRegistry;
use crate::validation::{validate_device_id, validate_snowflake};

type Key = (String, i64);

/// A [`DeviceRegistry`] held in an ordered map keyed by `(device_id, author_id)`.
///
/// Validation and ordering match [`crate::SqliteRegistry`].
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    bindings: RwLock<BTreeMap<Key, DeviceBinding>>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRegistry for MemoryRegistry {
    async fn upsert(
        &self,
        device_id: &str,
        author_id: i64,
        message_id: i64,
        channel_id: i64,
    ) -> Result<DeviceBinding> {
        let binding =
            DeviceBinding::new(device_id, author_id, message_id, channel_id).validated()?;

        let mut bindings = self.bindings.write().await;
        bindings.insert(
            (binding.device_id.clone(), binding.author_id),
            binding.clone(),
        );

        Ok(binding)
    }

    async fn lookup(&self, device_id: &str, author_id: i64) -> Result<DeviceBinding> {
        let device_id = validate_device_id(device_id)?;
        let author_id = validate_snowflake("author_id", author_id)?;

        let bindings = self.bindings.read().await;
        bindings
            .get(&(device_id.to_string(), author_id))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                device_id: device_id.to_string(),
                author_id,
            })
    }

    async fn list_by_device(&self, device_id: &str) -> Result<Vec<DeviceBinding>> {
        let device_id = validate_device_id(device_id)?;

        let bindings = self.bindings.read().await;
        let start = (device_id.to_string(), i64::MIN);
        Ok(bindings
            .range(start..)
            .take_while(|((device, _), _)| device == device_id)
            .map(|(_, binding)| binding.clone())
            .collect())
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<DeviceBinding>> {
        let author_id = validate_snowflake("author_id", author_id)?;

        let bindings = self.bindings.read().await;
        Ok(bindings
            .values()
            .filter(|binding| binding.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn remove(&self, device_id: &str, author_id: i64) -> Result<bool> {
        let device_id = validate_device_id(device_id)?;
        let author_id = validate_snowflake("author_id", author_id)?;

        let mut bindings = self.bindings.write().await;
        Ok(bindings.remove(&(device_id.to_string(), author_id)).is_some())
    }

    async fn lookup_by_message(&self, message_id: i64) -> Result<DeviceBinding> {
        let message_id = validate_snowflake("message_id", message_id)?;

        let bindings = self.bindings.read().await;
        bindings
            .values()
            .find(|binding| binding.message_id == message_id)
            .cloned()
            .ok_or(RegistryError::MessageNotFound { message_id })
    }

    async fn remove_by_message(&self, message_id: i64) -> Result<u64> {
        let message_id = validate_snowflake("message_id", message_id)?;

        let mut bindings = self.bindings.write().await;
        let before = bindings.len();
        bindings.retain(|_, binding| binding.message_id != message_id);
        Ok((before - bindings.len()) as u64)
    }

    async fn remove_device(&self, device_id: &str) -> Result<u64> {
        let device_id = validate_device_id(device_id)?;

        let mut bindings = self.bindings.write().await;
        let before = bindings.len();
        bindings.retain(|(device, _), _| device != device_id);
        Ok((before - bindings.len()) as u64)
    }

    async fn list_all(&self) -> Result<Vec<DeviceBinding>> {
        let bindings = self.bindings.read().await;
        Ok(bindings.values().cloned().collect())
    }

    async fn count(&self) -> Result<i64> {
        let bindings = self.bindings.read().await;
        Ok(bindings.len() as i64)
    }
}
