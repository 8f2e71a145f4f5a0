//! Input validation for device bindings.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Discord snowflakes are never negative.
    NegativeSnowflake { field: String, value: i64 },
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NegativeSnowflake { field, value } => {
                write!(f, "{} must not be negative (got {})", field, value)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} bytes, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for device ids, in bytes.
pub const MAX_DEVICE_ID_LENGTH: usize = 255;

/// Validate a Tuya device id.
///
/// Device ids are opaque: whatever the IoT cloud issued is stored and
/// matched byte for byte. Only the empty string and absurdly long values
/// are refused.
pub fn validate_device_id(device_id: &str) -> Result<&str, ValidationError> {
    if device_id.is_empty() {
        return Err(ValidationError::Empty("device_id".to_string()));
    }

    if device_id.len() > MAX_DEVICE_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: "device_id".to_string(),
            max: MAX_DEVICE_ID_LENGTH,
            actual: device_id.len(),
        });
    }

    Ok(device_id)
}

/// Validate a Discord snowflake stored as a signed 64-bit integer.
pub fn validate_snowflake(field: &str, value: i64) -> Result<i64, ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeSnowflake {
            field: field.to_string(),
            value,
        });
    }

    Ok(value)
}
