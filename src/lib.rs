//! Natter - Command-line chat demo library
//!
//! This library provides the core functionality for the natter chat demo,
//! including persistent conversation storage, the canned bot responder,
//! IP geolocation lookups, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: SQLite-backed conversation store and change notifications
//! - `bot`: Canned bot responder with a simulated typing delay
//! - `ipinfo`: IP geolocation client for the ip-api.com service
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use natter::{ChatMessage, ChatStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = ChatStore::new_with_path("history.db")?;
//!     store.append_message(&ChatMessage::user("Hello"), "my-session");
//!
//!     for session in store.sessions() {
//!         println!("{}: {}", session.id, session.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod ipinfo;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{NatterError, Result};
pub use ipinfo::{IpInfo, IpInfoClient};
pub use storage::{ChatMessage, ChatStore, SessionRecord, StoreEvent};
