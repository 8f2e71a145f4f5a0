//! Command-line arguments.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "registry-admin")]
#[command(about = "Inspect and repair the Discord device registry")]
pub struct Args {
    /// SQLite database URL. Falls back to DEVICE_REGISTRY_URL env.
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Bind a device to a Discord user, replacing any previous provenance
    Register {
        /// Tuya device id
        #[arg(long)]
        device: String,

        /// Discord user id
        #[arg(long)]
        author: i64,

        /// Discord message id holding the control panel
        #[arg(long)]
        message: i64,

        /// Discord channel id of that message
        #[arg(long)]
        channel: i64,
    },

    /// Show the binding for a device and user
    Show {
        #[arg(long)]
        device: String,

        #[arg(long)]
        author: i64,
    },

    /// List bindings for a device, for a user, or all of them
    List {
        #[arg(long, conflicts_with = "author")]
        device: Option<String>,

        #[arg(long)]
        author: Option<i64>,
    },

    /// Remove the binding for a device and user
    Remove {
        #[arg(long)]
        device: String,

        #[arg(long)]
        author: i64,
    },

    /// Remove every binding posted from a message
    PruneMessage {
        #[arg(long)]
        message: i64,
    },

    /// Remove every binding for a device
    PruneDevice {
        #[arg(long)]
        device: String,
    },

    /// Count stored bindings
    Count,
}
