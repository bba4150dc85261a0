use super::registry::SessionRegistry;
use crate::core::error::ChatResult;
use crate::pagination;
use crate::storage::{SessionSummary, TranscriptEntry, TranscriptStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Prune idle turn locks once the map grows past this many sessions.
const TURN_LOCK_PRUNE_THRESHOLD: usize = 256;

/// Reply stored for a "bye" message instead of asking the model.
pub const FAREWELL: &str = "👋 Goodbye!\nHope we chat again soon!";

/// `bye` in any ASCII casing ends the chat without a remote call.
pub fn is_farewell(message: &str) -> bool {
    message.eq_ignore_ascii_case("bye")
}

/// Sends turns and reads transcripts. Shared by the HTTP server and the CLI.
///
/// One turn per session runs at a time, from the remote call through the
/// append, so the transcript records turns in the order the model saw them.
pub struct ChatService {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn TranscriptStore>,
    turns: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChatService {
    pub fn new(registry: Arc<SessionRegistry>, store: Arc<dyn TranscriptStore>) -> Self {
        Self {
            registry,
            store,
            turns: Mutex::new(HashMap::new()),
        }
    }

    async fn turn_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut turns = self.turns.lock().await;
        if turns.len() > TURN_LOCK_PRUNE_THRESHOLD {
            turns.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        turns
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Run one turn and persist it. The stored bot text is the model's plain
    /// reply (trimmed); a failed remote call stores nothing.
    pub async fn send(&self, session_id: &str, message: &str) -> ChatResult<TranscriptEntry> {
        let lock = self.turn_lock(session_id).await;
        let _turn = lock.lock().await;

        let reply = if is_farewell(message) {
            tracing::info!("[ChatService] Session '{}' said goodbye", session_id);
            FAREWELL.to_string()
        } else {
            let handle = self.registry.get_or_create(session_id).await?;
            let reply = handle.send(message).await.map_err(|e| {
                tracing::error!("[ChatService] Session '{}' remote call failed: {}", session_id, e);
                e
            })?;
            reply.trim().to_string()
        };

        self.store.append(session_id, message, &reply).await
    }

    pub async fn transcript(&self, session_id: &str) -> ChatResult<Vec<TranscriptEntry>> {
        self.store.load_all(session_id).await
    }

    /// Up to `batch` entries ending `offset` entries before the newest.
    pub async fn page(
        &self,
        session_id: &str,
        offset: usize,
        batch: usize,
    ) -> ChatResult<Vec<TranscriptEntry>> {
        let entries = self.store.load_all(session_id).await?;
        Ok(pagination::page(&entries, offset, batch).to_vec())
    }

    pub async fn sessions(&self) -> ChatResult<Vec<SessionSummary>> {
        self.store.list_sessions().await
    }

    /// Remove a transcript and its live handle.
    pub async fn delete(&self, session_id: &str) -> ChatResult<bool> {
        self.registry.evict(session_id).await;
        self.store.delete(session_id).await
    }
}
