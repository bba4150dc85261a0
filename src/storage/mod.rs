//! Transcript Storage Abstraction
//!
//! Information Hiding:
//! - Storage backend hidden behind the `TranscriptStore` trait
//! - Each session's transcript is an append-only list of turns
//! - Missing sessions read as empty transcripts, never as errors

use crate::core::error::ChatResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod filesystem;
pub mod memory;

pub use filesystem::FileSystemStore;
pub use memory::InMemoryStore;

/// Sidebar titles longer than this many characters are cut and get `...`.
pub const TITLE_MAX_CHARS: usize = 30;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One conversational turn. Written once, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub user: String,
    pub bot: String,
    #[serde(default)]
    pub timestamp: String,
}

impl TranscriptEntry {
    /// New entry stamped with the local wall clock, second precision.
    pub fn now(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
}

impl SessionSummary {
    /// Summary for a transcript; `None` when it has no entries.
    pub fn from_transcript(id: impl Into<String>, entries: &[TranscriptEntry]) -> Option<Self> {
        entries.first().map(|first| Self {
            id: id.into(),
            title: title_preview(&first.user),
        })
    }
}

pub fn title_preview(text: &str) -> String {
    match text.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Append one turn to the session's transcript and return it.
    async fn append(&self, session_id: &str, user: &str, bot: &str) -> ChatResult<TranscriptEntry>;

    /// Full transcript in append order; empty if the session has none.
    async fn load_all(&self, session_id: &str) -> ChatResult<Vec<TranscriptEntry>>;

    /// Every non-empty session with its title preview. Order is unspecified.
    async fn list_sessions(&self) -> ChatResult<Vec<SessionSummary>>;

    /// Remove a session's transcript. Returns whether anything was removed.
    async fn delete(&self, session_id: &str) -> ChatResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_title_unchanged() {
        assert_eq!(title_preview("Hello"), "Hello");
        let exact = "a".repeat(TITLE_MAX_CHARS);
        assert_eq!(title_preview(&exact), exact);
    }

    #[test]
    fn test_long_title_truncated_with_ellipsis() {
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        assert_eq!(title_preview(long), "abcdefghijklmnopqrstuvwxyz0123...");
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let long = "é".repeat(31);
        let title = title_preview(&long);
        assert_eq!(title, format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn test_summary_of_empty_transcript_is_none() {
        assert!(SessionSummary::from_transcript("s", &[]).is_none());
    }

    #[test]
    fn test_timestamp_has_second_precision() {
        let entry = TranscriptEntry::now("u", "b");
        assert!(chrono::NaiveDateTime::parse_from_str(&entry.timestamp, TIMESTAMP_FORMAT).is_ok());
    }
}
