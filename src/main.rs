//! Natter - Command-line chat demo
//!
#![doc = "Natter - Command-line chat demo with persistent history."]
#![doc = "Main entry point for the natter application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use natter::cli::{Cli, Commands};
use natter::commands;
use natter::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a storage path on the CLI (or via env),
    // mirror it into NATTER_HISTORY_DB so the storage initializer can pick it up.
    // This keeps callers unchanged while allowing `ChatStore::new()` to
    // honor an override.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("NATTER_HISTORY_DB", db_path);
        tracing::info!("Using storage DB override from CLI: {}", db_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { resume, last } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(r) = &resume {
                tracing::debug!("Resuming conversation: {}", r);
            }
            if last {
                tracing::debug!("Resuming most recent conversation");
            }

            // Moves `config` into the handler (match arms are exclusive)
            commands::chat::run_chat(config, resume, last).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
        Commands::Ipinfo { ip, json } => {
            tracing::info!("Starting IP lookup command");
            commands::ipinfo::run_ipinfo(&config, ip, json).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("natter=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
