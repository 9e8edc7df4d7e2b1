//! # Chat Data Transfer Objects
//!
//! Defines the document shape of the shared conversation log and the request
//! body sent to the remote tuition assistant gateway.

use serde::{Deserialize, Serialize};

/// Who authored a conversation entry.
///
/// Serializes to the lowercase strings `"user"` / `"ai"` used by the shared
/// log document shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// One persisted line of the shared conversation log.
///
/// `id` and `timestamp` are assigned by the store at creation time.
/// `timestamp` is the store's monotonic ordering token and is used only for
/// sort order; `time` is the client-formatted display string frozen when the
/// entry was drafted. Entries are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatEntry {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: u64,
    pub time: String,
}

/// A conversation entry as submitted by a writer, before the store has
/// assigned its `id` and ordering token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryDraft {
    pub text: String,
    pub sender: Sender,
    pub time: String,
}

impl EntryDraft {
    /// Draft a user entry stamped with the current wall-clock display time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            time: display_time(),
        }
    }

    /// Draft an assistant entry stamped with the current wall-clock display time.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Ai,
            time: display_time(),
        }
    }

    /// Draft an assistant failure entry. The display time slot carries the
    /// fixed `"Error"` marker instead of a clock time.
    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Ai,
            time: ERROR_TIME_MARKER.to_string(),
        }
    }
}

/// Display-time marker used for assistant failure entries.
pub const ERROR_TIME_MARKER: &str = "Error";

/// Short hour:minute display string, computed once at draft time and frozen.
pub fn display_time() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

/// Request body for the remote tuition assistant gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_wire_format() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Ai).unwrap(), "\"ai\"");
    }

    #[test]
    fn test_entry_round_trip() {
        let entry = ChatEntry {
            id: "abc".to_string(),
            text: "Check my tuition".to_string(),
            sender: Sender::User,
            timestamp: 7,
            time: "14:30".to_string(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: ChatEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_user_draft_has_clock_time() {
        let draft = EntryDraft::user("hello");
        assert_eq!(draft.sender, Sender::User);
        // %H:%M is always five characters with a colon in the middle
        assert_eq!(draft.time.len(), 5);
        assert_eq!(&draft.time[2..3], ":");
    }

    #[test]
    fn test_error_draft_uses_marker() {
        let draft = EntryDraft::assistant_error("sorry");
        assert_eq!(draft.sender, Sender::Ai);
        assert_eq!(draft.time, ERROR_TIME_MARKER);
    }
}
