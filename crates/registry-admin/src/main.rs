//! Operator CLI for the Discord device registry.
//!
//! Runs one registry operation per invocation so the `device_info_view`
//! table can be inspected or repaired without going through the bot.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use device_registry::{Database, SqliteRegistry};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::from_env()?.with_database_url(args.database_url.as_deref());
    info!(url = %config.database_url, "Opening device registry");

    let db = Database::connect_with_pool_size(&config.database_url, config.pool_size).await?;
    db.migrate().await?;
    let registry = SqliteRegistry::new(db.clone());

    let result = commands::run(&registry, args.command).await;
    db.close().await;

    let outcome = result?;
    let rendered = if args.json {
        outcome.to_json()?
    } else {
        outcome.to_text()
    };
    println!("{}", rendered);

    Ok(())
}
