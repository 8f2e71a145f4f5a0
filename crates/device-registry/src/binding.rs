//! Device binding operations on the `device_info_view` table.
//!
//! Every function here is a single SQL statement, so each call is atomic on
//! its own. Uniqueness of `(device_id, author_id)` is enforced by the table's
//! primary key, not by any in-process locking.

use sqlx::SqlitePool;

use crate::error::{RegistryError, Result};
use crate::models::DeviceBinding;
use crate::validation::{validate_device_id, validate_snowflake};

/// Insert a binding, or replace the message and channel of an existing one.
///
/// Returns the row as stored after the statement.
pub async fn upsert_binding(pool: &SqlitePool, binding: &DeviceBinding) -> Result<DeviceBinding> {
    let binding = binding.clone().validated()?;

    let stored = sqlx::query_as::<_, DeviceBinding>(
        r#"
        INSERT INTO device_info_view (device_id, author_id, message_id, channel_id)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(device_id, author_id) DO UPDATE SET
            message_id = excluded.message_id,
            channel_id = excluded.channel_id
        RETURNING device_id, author_id, message_id, channel_id
        "#,
    )
    .bind(&binding.device_id)
    .bind(binding.author_id)
    .bind(binding.message_id)
    .bind(binding.channel_id)
    .fetch_one(pool)
    .await?;

    tracing::info!(
        device_id = %stored.device_id,
        author_id = stored.author_id,
        message_id = stored.message_id,
        "Stored device binding"
    );

    Ok(stored)
}

/// Get the binding for a device and author.
pub async fn get_binding(pool: &SqlitePool, device_id: &str, author_id: i64) -> Result<DeviceBinding> {
    let device_id = validate_device_id(device_id)?;
    let author_id = validate_snowflake("author_id", author_id)?;

    sqlx::query_as::<_, DeviceBinding>(
        r#"
        SELECT device_id, author_id, message_id, channel_id
        FROM device_info_view
        WHERE device_id = ? AND author_id = ?
        "#,
    )
    .bind(device_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RegistryError::NotFound {
        device_id: device_id.to_string(),
        author_id,
    })
}

/// Get the binding whose control panel lives in the given message.
pub async fn get_binding_by_message(pool: &SqlitePool, message_id: i64) -> Result<DeviceBinding> {
    let message_id = validate_snowflake("message_id", message_id)?;

    sqlx::query_as::<_, DeviceBinding>(
        r#"
        SELECT device_id, author_id, message_id, channel_id
        FROM device_info_view
        WHERE message_id = ?
        ORDER BY device_id, author_id
        LIMIT 1
        "#,
    )
    .bind(message_id)
    .fetch_optional(pool)
    .await?
    .ok_or(RegistryError::MessageNotFound { message_id })
}

/// List every author who registered a device.
pub async fn list_by_device(pool: &SqlitePool, device_id: &str) -> Result<Vec<DeviceBinding>> {
    let device_id = validate_device_id(device_id)?;

    let bindings = sqlx::query_as::<_, DeviceBinding>(
        r#"
        SELECT device_id, author_id, message_id, channel_id
        FROM device_info_view
        WHERE device_id = ?
        ORDER BY author_id
        "#,
    )
    .bind(device_id)
    .fetch_all(pool)
    .await?;

    tracing::debug!(device_id, count = bindings.len(), "Listed bindings by device");
    Ok(bindings)
}

/// List every device an author registered.
pub async fn list_by_author(pool: &SqlitePool, author_id: i64) -> Result<Vec<DeviceBinding>> {
    let author_id = validate_snowflake("author_id", author_id)?;

    let bindings = sqlx::query_as::<_, DeviceBinding>(
        r#"
        SELECT device_id, author_id, message_id, channel_id
        FROM device_info_view
        WHERE author_id = ?
        ORDER BY device_id
        "#,
    )
    .bind(author_id)
    .fetch_all(pool)
    .await?;

    tracing::debug!(author_id, count = bindings.len(), "Listed bindings by author");
    Ok(bindings)
}

/// List all bindings.
pub async fn list_bindings(pool: &SqlitePool) -> Result<Vec<DeviceBinding>> {
    let bindings = sqlx::query_as::<_, DeviceBinding>(
        r#"
        SELECT device_id, author_id, message_id, channel_id
        FROM device_info_view
        ORDER BY device_id, author_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(bindings)
}

/// Count total bindings.
pub async fn count_bindings(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM device_info_view
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Delete the binding for a device and author.
///
/// Returns true if a binding was deleted, false if none existed.
pub async fn delete_binding(pool: &SqlitePool, device_id: &str, author_id: i64) -> Result<bool> {
    let device_id = validate_device_id(device_id)?;
    let author_id = validate_snowflake("author_id", author_id)?;

    let result = sqlx::query(
        r#"
        DELETE FROM device_info_view
        WHERE device_id = ? AND author_id = ?
        "#,
    )
    .bind(device_id)
    .bind(author_id)
    .execute(pool)
    .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::info!(device_id, author_id, "Removed device binding");
    }

    Ok(deleted)
}

/// Delete every binding posted from a message.
///
/// Returns the number of bindings deleted.
pub async fn delete_by_message(pool: &SqlitePool, message_id: i64) -> Result<u64> {
    let message_id = validate_snowflake("message_id", message_id)?;

    let result = sqlx::query(
        r#"
        DELETE FROM device_info_view
        WHERE message_id = ?
        "#,
    )
    .bind(message_id)
    .execute(pool)
    .await?;

    let removed = result.rows_affected();
    if removed > 0 {
        tracing::info!(message_id, removed, "Removed bindings for message");
    }

    Ok(removed)
}

/// Delete every binding for a device, whoever registered it.
///
/// Returns the number of bindings deleted.
pub async fn delete_device(pool: &SqlitePool, device_id: &str) -> Result<u64> {
    let device_id = validate_device_id(device_id)?;

    let result = sqlx::query(
        r#"
        DELETE FROM device_info_view
        WHERE device_id = ?
        "#,
    )
    .bind(device_id)
    .execute(pool)
    .await?;

    let removed = result.rows_affected();
    if removed > 0 {
        tracing::info!(device_id, removed, "Removed bindings for device");
    }

    Ok(removed)
}
