//! In-Memory Transcript Storage
//!
//! Information Hiding:
//! - HashMap storage structure hidden from users
//! - Thread-safe access via RwLock hidden behind async interface
//! - Suitable for testing and ephemeral servers

use super::{SessionSummary, TranscriptEntry, TranscriptStore};
use crate::core::error::ChatResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Data is lost when the process terminates.
#[derive(Default)]
pub struct InMemoryStore {
    sessions: RwLock<HashMap<String, Vec<TranscriptEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryStore {
    async fn append(&self, session_id: &str, user: &str, bot: &str) -> ChatResult<TranscriptEntry> {
        let entry = TranscriptEntry::now(user, bot);
        let mut sessions = self.sessions.write().await;
        let transcript = sessions.entry(session_id.to_string()).or_default();
        transcript.push(entry.clone());
        tracing::debug!(
            "[InMemoryStore] Appended entry #{} for session '{}'",
            transcript.len(),
            session_id
        );
        Ok(entry)
    }

    async fn load_all(&self, session_id: &str) -> ChatResult<Vec<TranscriptEntry>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn list_sessions(&self) -> ChatResult<Vec<SessionSummary>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .iter()
            .filter_map(|(id, entries)| SessionSummary::from_transcript(id.as_str(), entries))
            .collect())
    }

    async fn delete(&self, session_id: &str) -> ChatResult<bool> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(session_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_load() {
        let store = InMemoryStore::new();
        store.append("test-session", "Hello", "Hi there").await.unwrap();
        store.append("test-session", "Again", "Sure").await.unwrap();

        let loaded = store.load_all("test-session").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].user, "Hello");
        assert_eq!(loaded[1].bot, "Sure");
    }

    #[tokio::test]
    async fn test_load_nonexistent_session() {
        let store = InMemoryStore::new();
        assert!(store.load_all("nonexistent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let store = InMemoryStore::new();
        store.append("session-1", "Test", "ok").await.unwrap();
        store.append("session-2", "Other", "ok").await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);

        assert!(store.delete("session-1").await.unwrap());
        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions, vec![SessionSummary {
            id: "session-2".to_string(),
            title: "Other".to_string(),
        }]);
    }
}
