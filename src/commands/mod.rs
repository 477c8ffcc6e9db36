/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`    — Interactive chat with the canned bot
- `history` — Conversation history listing and deletion
- `ipinfo`  — IP-geolocation lookup

These handlers are intentionally small and use the library components:
the chat store, the bot responder, and the IP-info client.
*/

use crate::config::Config;
use crate::error::Result;
use crate::storage::{ChatMessage, ChatStore};
use colored::Colorize;

pub mod chat;
pub mod history;
pub mod ipinfo;

/// Build the chat store from config, honoring a configured path override.
///
/// A failure here is fatal to the invoking command: nothing works without
/// the store.
pub(crate) fn open_store(config: &Config) -> Result<ChatStore> {
    match &config.storage.db_path {
        Some(path) => ChatStore::new_with_path(path),
        None => ChatStore::new(),
    }
}

/// Resolve a session id that may be a full id or an 8-char style prefix.
pub(crate) fn resolve_session_id(store: &ChatStore, needle: &str) -> Option<String> {
    if needle.trim().is_empty() {
        return None;
    }
    if store.session(needle).is_some() {
        return Some(needle.to_string());
    }
    store
        .sessions()
        .into_iter()
        .map(|s| s.id)
        .find(|id| id.starts_with(needle))
}

/// Print a conversation transcript in reading order
pub(crate) fn print_transcript(messages: &[ChatMessage]) {
    for message in messages {
        let time = message.timestamp.format("%H:%M").to_string().dimmed();
        if message.is_from_user {
            println!("{} {} {}", time, "you>".green().bold(), message.text);
        } else {
            println!("{} {} {}", time, "bot>".cyan().bold(), message.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn temp_store() -> (ChatStore, tempfile::TempDir) {
        let dir = tempdir().expect("tempdir failed");
        let store =
            ChatStore::new_with_path(dir.path().join("history.db")).expect("store failed");
        (store, dir)
    }

    #[test]
    fn test_open_store_uses_configured_path() {
        let dir = tempdir().expect("tempdir failed");
        let db_path = dir.path().join("custom.db");

        let mut config = Config::default();
        config.storage.db_path = Some(db_path.to_string_lossy().to_string());

        let _store = open_store(&config).expect("open failed");
        assert!(db_path.exists());
    }

    #[test]
    fn test_resolve_session_id_exact_match() {
        let (store, _dir) = temp_store();
        let _ = store.create_session("abcd1234-full-id");

        let resolved = resolve_session_id(&store, "abcd1234-full-id");
        assert_eq!(resolved, Some("abcd1234-full-id".to_string()));
    }

    #[test]
    fn test_resolve_session_id_prefix_match() {
        let (store, _dir) = temp_store();
        let _ = store.create_session("abcd1234-full-id");

        let resolved = resolve_session_id(&store, "abcd1234");
        assert_eq!(resolved, Some("abcd1234-full-id".to_string()));
    }

    #[test]
    fn test_resolve_session_id_no_match() {
        let (store, _dir) = temp_store();
        let _ = store.create_session("abcd1234-full-id");

        assert!(resolve_session_id(&store, "zzzz").is_none());
        assert!(resolve_session_id(&store, "").is_none());
    }

    #[test]
    fn test_print_transcript_smoke() {
        let messages = vec![ChatMessage::user("Hello"), ChatMessage::bot("Hi there")];
        // Smoke test: must not panic.
        print_transcript(&messages);
    }
}
