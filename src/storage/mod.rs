//! Conversation persistence for Natter
//!
//! [`ChatStore`] holds chat sessions and their messages in a SQLite
//! database. Each operation opens a short-lived connection; the store is
//! meant to be driven from one logical execution context and performs no
//! locking of its own.
//!
//! Failure semantics are deliberately shallow: construction errors are
//! fatal to the caller, read errors degrade to empty results, and write
//! errors are logged at debug level and swallowed. The chat content is
//! throwaway demo data; a lost write is an accepted outcome.

use crate::error::{NatterError, Result};
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use tokio::sync::broadcast;

pub mod events;
pub mod types;

pub use events::StoreEvent;
pub use types::{ChatMessage, SessionRecord};

/// Placeholder title a session carries until its first message arrives
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Maximum number of characters of the first message used as the title
const TITLE_MAX_CHARS: usize = 50;

/// Storage backend for chat sessions and messages
pub struct ChatStore {
    db_path: PathBuf,
    events: broadcast::Sender<StoreEvent>,
}

impl ChatStore {
    /// Create a new store instance
    ///
    /// Initializes the database file in the user's data directory.
    pub fn new() -> Result<Self> {
        // Allow override of the history DB path via environment variable.
        // This makes it easy to point the binary at a test DB or alternate
        // file without changing the user's application data dir.
        if let Ok(override_path) = std::env::var("NATTER_HISTORY_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("dev", "natter", "natter")
            .ok_or_else(|| NatterError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        let db_path = data_dir.join("history.db");
        Self::new_with_path(db_path)
    }

    /// Create a new store instance that uses the specified database path.
    ///
    /// This is primarily useful for tests where the default application
    /// data directory is not desirable (for example, a temporary directory).
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| NatterError::Storage(e.to_string()))?;
        }

        let store = Self {
            db_path,
            events: events::channel(),
        };
        store.init()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create sessions table")
        .map_err(|e| NatterError::Storage(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                text TEXT NOT NULL,
                is_from_user INTEGER NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create messages table")
        .map_err(|e| NatterError::Storage(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_messages_session ON messages (session_id)",
            [],
        )
        .context("Failed to create message index")
        .map_err(|e| NatterError::Storage(e.to_string()))?;

        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| NatterError::Storage(e.to_string()).into())
    }

    /// Subscribe to change notifications.
    ///
    /// Dropping the receiver unsubscribes. An event arrives shortly after
    /// each successful append; there is no ordering guarantee beyond FIFO
    /// delivery per receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // --- Sessions ---

    /// Insert a new session with the default title and both timestamps set
    /// to now. Returns `None` if the id is empty or the write fails.
    pub fn create_session(&self, id: &str) -> Option<SessionRecord> {
        if id.trim().is_empty() {
            tracing::debug!("Refusing to create session with empty id");
            return None;
        }
        match self.try_create_session(id) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Failed to create session {}: {}", id, e);
                None
            }
        }
    }

    fn try_create_session(&self, id: &str) -> Result<SessionRecord> {
        let conn = self.open()?;
        let now = now_string();

        conn.execute(
            "INSERT INTO sessions (id, title, created_at, updated_at)
            VALUES (?, ?, ?, ?)",
            params![id, DEFAULT_SESSION_TITLE, now, now],
        )
        .context("Failed to insert session")
        .map_err(|e| NatterError::Storage(e.to_string()))?;

        let created = parse_timestamp(&now);
        Ok(SessionRecord {
            id: id.to_string(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            created_at: created,
            updated_at: created,
            message_count: 0,
        })
    }

    /// Point lookup by id. Returns `None` if absent or on a read failure.
    pub fn session(&self, id: &str) -> Option<SessionRecord> {
        match self.try_session(id) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("Failed to fetch session {}: {}", id, e);
                None
            }
        }
    }

    fn try_session(&self, id: &str) -> Result<Option<SessionRecord>> {
        let conn = self.open()?;
        let record = conn
            .query_row(
                "SELECT s.id, s.title, s.created_at, s.updated_at,
                    (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.id)
                FROM sessions s WHERE s.id = ?",
                params![id],
                session_from_row,
            )
            .optional()
            .context("Failed to query session")
            .map_err(|e| NatterError::Storage(e.to_string()))?;
        Ok(record)
    }

    /// Return the existing session or create one. `None` only if the id is
    /// malformed or the store itself fails.
    pub fn get_or_create_session(&self, id: &str) -> Option<SessionRecord> {
        if let Some(existing) = self.session(id) {
            return Some(existing);
        }
        self.create_session(id)
    }

    /// All sessions ordered by `updated_at` descending; empty on failure.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        match self.try_sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::debug!("Failed to list sessions: {}", e);
                Vec::new()
            }
        }
    }

    fn try_sessions(&self) -> Result<Vec<SessionRecord>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT s.id, s.title, s.created_at, s.updated_at,
                    (SELECT COUNT(*) FROM messages m WHERE m.session_id = s.id)
                FROM sessions s
                ORDER BY s.updated_at DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], session_from_row)
            .context("Failed to query sessions")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        let mut sessions = Vec::new();
        for s in rows.flatten() {
            sessions.push(s);
        }
        Ok(sessions)
    }

    /// The most recently updated session, if any. Used to reopen the last
    /// conversation on `chat --last`.
    pub fn last_session(&self) -> Option<SessionRecord> {
        self.sessions().into_iter().next()
    }

    /// Remove the session and all its messages. The two deletes run inside
    /// a single transaction so a partial cascade is never visible.
    pub fn delete_session(&self, id: &str) {
        if let Err(e) = self.try_delete_session(id) {
            tracing::debug!("Failed to delete session {}: {}", id, e);
        }
    }

    fn try_delete_session(&self, id: &str) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        tx.execute("DELETE FROM messages WHERE session_id = ?", params![id])
            .context("Failed to delete session messages")
            .map_err(|e| NatterError::Storage(e.to_string()))?;
        tx.execute("DELETE FROM sessions WHERE id = ?", params![id])
            .context("Failed to delete session")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| NatterError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Remove every session and every message (the "clear history" action).
    pub fn delete_all_sessions(&self) {
        if let Err(e) = self.try_delete_all_sessions() {
            tracing::debug!("Failed to clear sessions: {}", e);
        }
    }

    fn try_delete_all_sessions(&self) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        tx.execute("DELETE FROM messages", [])
            .context("Failed to delete messages")
            .map_err(|e| NatterError::Storage(e.to_string()))?;
        tx.execute("DELETE FROM sessions", [])
            .context("Failed to delete sessions")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| NatterError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Bump `updated_at` to now without touching messages, so a reopened
    /// chat resurfaces to the top of the history ordering. No-op if the
    /// session does not exist.
    pub fn mark_accessed(&self, id: &str) {
        if let Err(e) = self.try_mark_accessed(id) {
            tracing::debug!("Failed to mark session {} accessed: {}", id, e);
        }
    }

    fn try_mark_accessed(&self, id: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "UPDATE sessions SET updated_at = ? WHERE id = ?",
            params![now_string(), id],
        )
        .context("Failed to update session access time")
        .map_err(|e| NatterError::Storage(e.to_string()))?;
        Ok(())
    }

    // --- Messages ---

    /// The single write path for adding a message to a conversation.
    ///
    /// Invalid messages (empty id, empty or whitespace-only text) and
    /// empty session ids are silently discarded. Otherwise the message
    /// insert, the session's `updated_at` bump, and the title assignment
    /// from the first message commit as one transaction, and a
    /// [`StoreEvent::SessionUpdated`] is published afterwards.
    pub fn append_message(&self, message: &ChatMessage, session_id: &str) {
        if !message.is_valid() || session_id.trim().is_empty() {
            tracing::debug!("Dropping invalid message for session {:?}", session_id);
            return;
        }

        if let Err(e) = self.try_append_message(message, session_id) {
            tracing::debug!("Failed to append message to {}: {}", session_id, e);
            return;
        }

        // Fire-and-forget: no receivers is fine.
        let _ = self.events.send(StoreEvent::SessionUpdated {
            session_id: session_id.to_string(),
        });
    }

    fn try_append_message(&self, message: &ChatMessage, session_id: &str) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        let now = now_string();

        // Resolve or create the session, preserving created_at and title
        // of an existing one.
        let existing: Option<String> = tx
            .query_row(
                "SELECT title FROM sessions WHERE id = ?",
                params![session_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query session")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        let title = match existing {
            Some(title) => title,
            None => {
                tx.execute(
                    "INSERT INTO sessions (id, title, created_at, updated_at)
                    VALUES (?, ?, ?, ?)",
                    params![session_id, DEFAULT_SESSION_TITLE, now, now],
                )
                .context("Failed to insert session")
                .map_err(|e| NatterError::Storage(e.to_string()))?;
                DEFAULT_SESSION_TITLE.to_string()
            }
        };

        let message_count: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM messages WHERE session_id = ?",
                params![session_id],
                |row| row.get(0),
            )
            .context("Failed to count messages")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        tx.execute(
            "INSERT INTO messages (id, session_id, text, is_from_user, timestamp)
            VALUES (?, ?, ?, ?, ?)",
            params![
                message.id,
                session_id,
                message.text,
                message.is_from_user,
                timestamp_string(&message.timestamp),
            ],
        )
        .context("Failed to insert message")
        .map_err(|e| NatterError::Storage(e.to_string()))?;

        // First message (or still-placeholder title) names the session.
        let new_title = if message_count == 0 || title == DEFAULT_SESSION_TITLE {
            let prefix: String = message.text.chars().take(TITLE_MAX_CHARS).collect();
            let prefix = prefix.trim().to_string();
            if prefix.is_empty() {
                DEFAULT_SESSION_TITLE.to_string()
            } else {
                prefix
            }
        } else {
            title
        };

        tx.execute(
            "UPDATE sessions SET title = ?, updated_at = ? WHERE id = ?",
            params![new_title, now, session_id],
        )
        .context("Failed to update session metadata")
        .map_err(|e| NatterError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| NatterError::Storage(e.to_string()))?;
        Ok(())
    }

    /// All messages of a session in conversation reading order (oldest
    /// first). Unknown session ids and read failures yield an empty list;
    /// stored rows failing the validity gate are skipped.
    pub fn messages(&self, session_id: &str) -> Vec<ChatMessage> {
        match self.try_messages(session_id) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::debug!("Failed to read messages for {}: {}", session_id, e);
                Vec::new()
            }
        }
    }

    fn try_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, text, is_from_user, timestamp
                FROM messages
                WHERE session_id = ?
                ORDER BY timestamp ASC, rowid ASC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                let id: String = row.get(0)?;
                let text: String = row.get(1)?;
                let is_from_user: bool = row.get(2)?;
                let timestamp: String = row.get(3)?;
                Ok((id, text, is_from_user, timestamp))
            })
            .context("Failed to query messages")
            .map_err(|e| NatterError::Storage(e.to_string()))?;

        let messages = rows
            .flatten()
            .filter_map(|(id, text, is_from_user, timestamp)| {
                // Skip rows that fail the validity invariant instead of
                // failing the whole read.
                let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()?;
                let message = ChatMessage {
                    id,
                    text,
                    is_from_user,
                    timestamp,
                };
                message.is_valid().then_some(message)
            })
            .collect();

        Ok(messages)
    }
}

/// Current time as fixed-precision RFC 3339 text.
///
/// Microsecond precision keeps the column width constant so SQLite's text
/// ordering on `updated_at`/`timestamp` is chronological.
fn now_string() -> String {
    timestamp_string(&Utc::now())
}

fn timestamp_string(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRecord> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let created_at_str: String = row.get(2)?;
    let updated_at_str: String = row.get(3)?;
    let message_count: i64 = row.get(4)?;

    Ok(SessionRecord {
        id,
        title,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
        message_count: message_count.max(0) as usize,
    })
}
