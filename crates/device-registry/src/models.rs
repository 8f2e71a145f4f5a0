//! Registry models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::{validate_device_id, validate_snowflake, ValidationError};

/// A Discord user's registration of a Tuya device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeviceBinding {
    /// Tuya device id (opaque, issued by the IoT cloud)
    pub device_id: String,
    /// Discord user who registered the device
    pub author_id: i64,
    /// Discord message holding the device's control panel
    pub message_id: i64,
    /// Discord channel the message was posted in
    pub channel_id: i64,
}

impl DeviceBinding {
    /// Build a binding from raw identifiers.
    pub fn new(
        device_id: impl Into<String>,
        author_id: i64,
        message_id: i64,
        channel_id: i64,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            author_id,
            message_id,
            channel_id,
        }
    }

    /// Check every field. The device id is kept exactly as given.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let device_id = validate_device_id(&self.device_id)?.to_string();
        Ok(Self {
            device_id,
            author_id: validate_snowflake("author_id", self.author_id)?,
            message_id: validate_snowflake("message_id", self.message_id)?,
            channel_id: validate_snowflake("channel_id", self.channel_id)?,
        })
    }

    /// Composite key of the binding.
    pub fn key(&self) -> (&str, i64) {
        (&self.device_id, self.author_id)
    }
}
