//! Command-line interface definition for Natter
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, history management, and IP lookup.

use clap::{Parser, Subcommand};

/// Natter - canned-chat demo CLI
///
/// Chat with a canned-response bot, browse persistent conversation
/// history, and look up IP geolocation.
#[derive(Parser, Debug, Clone)]
#[command(name = "natter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the history database path
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Natter
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat with the bot
    Chat {
        /// Resume an existing conversation by ID (8-char prefix accepted)
        #[arg(short, long)]
        resume: Option<String>,

        /// Resume the most recently updated conversation
        #[arg(short, long)]
        last: bool,
    },

    /// Manage conversation history
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Look up IP geolocation
    Ipinfo {
        /// IP address to look up (omit for your own public IP)
        ip: Option<String>,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List all conversations, most recently updated first
    List,

    /// Show the transcript of a conversation
    Show {
        /// Conversation ID (8-char prefix accepted)
        id: String,
    },

    /// Delete a conversation and its messages
    Delete {
        /// Conversation ID (8-char prefix accepted)
        id: String,
    },

    /// Delete every conversation
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
