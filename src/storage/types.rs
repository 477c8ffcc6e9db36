use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for a stored chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique identifier for the session
    pub id: String,
    /// User-friendly title, taken from the first message
    pub title: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was last updated
    pub updated_at: DateTime<Utc>,
    /// Number of messages in the session
    pub message_count: usize,
}

/// A single chat message, either user- or bot-authored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier (UUID string)
    pub id: String,
    /// Display text; never empty for a valid message
    pub text: String,
    /// Sender discriminator: true = user, false = bot
    pub is_from_user: bool,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message with a fresh UUID and the current time
    pub fn new(text: impl Into<String>, is_from_user: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            is_from_user,
            timestamp: Utc::now(),
        }
    }

    /// Create a user-authored message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    /// Create a bot-authored message
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    /// Validity gate applied before persisting and when reading back.
    ///
    /// Whitespace-only text counts as empty: a message that would truncate
    /// to an empty title is dropped outright instead of being stored.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.text.trim().is_empty()
    }
}
