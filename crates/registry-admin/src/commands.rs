//! Admin command execution against any registry backend.

use device_registry::{DeviceBinding, DeviceRegistry};
use serde_json::json;
use tracing::info;

use crate::cli::Command;
use crate::error::Result;

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Binding(DeviceBinding),
    Bindings(Vec<DeviceBinding>),
    /// `show` found nothing; a negative answer, not a failure.
    Missing { device_id: String, author_id: i64 },
    Removed(u64),
    Count(i64),
}

/// Run one command.
pub async fn run(registry: &dyn DeviceRegistry, command: Command) -> Result<Outcome> {
    let outcome = match command {
        Command::Register {
            device,
            author,
            message,
            channel,
        } => {
            let binding = registry.upsert(&device, author, message, channel).await?;
            info!(device_id = %binding.device_id, author_id = binding.author_id, "Registered device");
            Outcome::Binding(binding)
        }
        Command::Show { device, author } => match registry.lookup(&device, author).await {
            Ok(binding) => Outcome::Binding(binding),
            Err(e) if e.is_not_found() => Outcome::Missing {
                device_id: device,
                author_id: author,
            },
            Err(e) => return Err(e.into()),
        },
        Command::List { device, author } => {
            let bindings = match (device, author) {
                (Some(device), _) => registry.list_by_device(&device).await?,
                (None, Some(author)) => registry.list_by_author(author).await?,
                (None, None) => registry.list_all().await?,
            };
            Outcome::Bindings(bindings)
        }
        Command::Remove { device, author } => {
            let removed = registry.remove(&device, author).await?;
            Outcome::Removed(u64::from(removed))
        }
        Command::PruneMessage { message } => {
            Outcome::Removed(registry.remove_by_message(message).await?)
        }
        Command::PruneDevice { device } => {
            Outcome::Removed(registry.remove_device(&device).await?)
        }
        Command::Count => Outcome::Count(registry.count().await?),
    };

    Ok(outcome)
}

impl Outcome {
    /// Render for a terminal.
    pub fn to_text(&self) -> String {
        match self {
            Outcome::Binding(binding) => format_binding(binding),
            Outcome::Bindings(bindings) if bindings.is_empty() => "no bindings".to_string(),
            Outcome::Bindings(bindings) => bindings
                .iter()
                .map(format_binding)
                .collect::<Vec<_>>()
                .join("\n"),
            Outcome::Missing {
                device_id,
                author_id,
            } => format!("no binding for device {} and author {}", device_id, author_id),
            Outcome::Removed(1) => "removed 1 binding".to_string(),
            Outcome::Removed(n) => format!("removed {} bindings", n),
            Outcome::Count(n) => n.to_string(),
        }
    }

    /// Render as a JSON document.
    pub fn to_json(&self) -> Result<String> {
        let value = match self {
            Outcome::Binding(binding) => serde_json::to_value(binding)?,
            Outcome::Bindings(bindings) => serde_json::to_value(bindings)?,
            Outcome::Missing {
                device_id,
                author_id,
            } => json!({ "device_id": device_id, "author_id": author_id, "found": false }),
            Outcome::Removed(n) => json!({ "removed": n }),
            Outcome::Count(n) => json!({ "count": n }),
        };

        Ok(serde_json::to_string_pretty(&value)?)
    }
}

fn format_binding(binding: &DeviceBinding) -> String {
    format!(
        "{:<24} author={:<20} message={:<20} channel={}",
        binding.device_id, binding.author_id, binding.message_id, binding.channel_id
    )
}
