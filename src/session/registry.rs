//! Session Registry - live conversation handles keyed by session id
//!
//! Information Hiding:
//! - Handle creation and replay policy hidden behind `get_or_create`
//! - LRU bookkeeping hidden; evicted sessions simply get a fresh handle
//! - Owned by the server state, never a process-wide global

use crate::config::ResumeMode;
use crate::core::error::ChatResult;
use crate::core::llm::{ChatMessage, Conversation, ModelClient};
use crate::storage::{TranscriptEntry, TranscriptStore};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type Handle = Arc<dyn Conversation>;

pub struct SessionRegistry {
    client: Arc<dyn ModelClient>,
    store: Arc<dyn TranscriptStore>,
    resume: ResumeMode,
    handles: Mutex<LruCache<String, Handle>>,
}

impl SessionRegistry {
    pub fn new(
        client: Arc<dyn ModelClient>,
        store: Arc<dyn TranscriptStore>,
        resume: ResumeMode,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            client,
            store,
            resume,
            handles: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Existing handle for `session_id`, or a new conversation. With
    /// [`ResumeMode::Replay`] the stored transcript seeds the new one.
    pub async fn get_or_create(&self, session_id: &str) -> ChatResult<Handle> {
        {
            let mut handles = self.handles.lock().await;
            if let Some(handle) = handles.get(session_id) {
                return Ok(handle.clone());
            }
        }

        // Loaded outside the lock so one slow transcript read does not stall
        // every other session.
        let history = match self.resume {
            ResumeMode::DisplayOnly => Vec::new(),
            ResumeMode::Replay => replay_history(&self.store.load_all(session_id).await?),
        };

        let mut handles = self.handles.lock().await;
        if let Some(handle) = handles.get(session_id) {
            return Ok(handle.clone());
        }

        tracing::info!(
            "[SessionRegistry] Starting conversation for session '{}' ({} replayed turns)",
            session_id,
            history.len() / 2
        );
        let handle = self.client.start_conversation(history);
        if let Some((evicted, _)) = handles.push(session_id.to_string(), handle.clone()) {
            tracing::debug!("[SessionRegistry] Evicted idle session '{}'", evicted);
        }
        Ok(handle)
    }

    /// Whether a live handle exists, without touching its recency.
    pub async fn contains(&self, session_id: &str) -> bool {
        self.handles.lock().await.contains(session_id)
    }

    pub async fn evict(&self, session_id: &str) -> bool {
        self.handles.lock().await.pop(session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn replay_history(entries: &[TranscriptEntry]) -> Vec<ChatMessage> {
    entries
        .iter()
        .flat_map(|entry| {
            [
                ChatMessage::user(entry.user.as_str()),
                ChatMessage::model(entry.bot.as_str()),
            ]
        })
        .collect()
}
