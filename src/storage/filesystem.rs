//! File System Transcript Storage
//!
//! Information Hiding:
//! - File paths and JSON serialization format hidden from users
//! - Per-session locking hidden behind the store interface
//! - Files stay compatible with the `{user, bot, timestamp}` array layout

use super::{SessionSummary, TranscriptEntry, TranscriptStore};
use crate::core::error::{ChatError, ChatResult};
use crate::session::parse_session_id;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Prune idle lock slots once the map grows past this many sessions.
const LOCK_PRUNE_THRESHOLD: usize = 256;

/// File system store - each session is a JSON array in
/// `{base_path}/{session_id}.json`.
///
/// Appends are read-modify-write; a per-session mutex keeps two appends to
/// the same session from clobbering each other inside this process.
pub struct FileSystemStore {
    base_path: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileSystemStore {
    pub async fn new(base_path: PathBuf) -> ChatResult<Self> {
        fs::create_dir_all(&base_path)
            .await
            .map_err(|e| ChatError::io(&base_path, e))?;

        Ok(Self {
            base_path,
            locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", session_id))
    }

    async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        if locks.len() > LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

async fn read_entries(path: &Path) -> ChatResult<Vec<TranscriptEntry>> {
    let json = match fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ChatError::io(path, e)),
    };

    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&json).map_err(|e| ChatError::corrupt(path, e))
}

async fn write_entries(path: &Path, entries: &[TranscriptEntry]) -> ChatResult<()> {
    let json = serde_json::to_string_pretty(entries).map_err(|e| ChatError::corrupt(path, e))?;

    // Write beside the target and rename over it.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .await
        .map_err(|e| ChatError::io(&tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| ChatError::io(path, e))
}

#[async_trait]
impl TranscriptStore for FileSystemStore {
    async fn append(&self, session_id: &str, user: &str, bot: &str) -> ChatResult<TranscriptEntry> {
        let path = self.session_path(session_id);
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let mut entries = read_entries(&path).await?;
        let entry = TranscriptEntry::now(user, bot);
        entries.push(entry.clone());
        write_entries(&path, &entries).await?;

        tracing::debug!(
            "[FileSystemStore] Appended entry #{} for session '{}' to {:?}",
            entries.len(),
            session_id,
            path
        );
        Ok(entry)
    }

    async fn load_all(&self, session_id: &str) -> ChatResult<Vec<TranscriptEntry>> {
        let path = self.session_path(session_id);
        let entries = read_entries(&path).await?;

        tracing::debug!(
            "[FileSystemStore] Loaded {} entries for session '{}'",
            entries.len(),
            session_id
        );
        Ok(entries)
    }

    async fn list_sessions(&self) -> ChatResult<Vec<SessionSummary>> {
        let mut sessions = Vec::new();
        let mut dir = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| ChatError::io(&self.base_path, e))?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ChatError::io(&self.base_path, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(session_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Only canonical ids can be opened again through the router.
            if parse_session_id(session_id).ok().as_deref() != Some(session_id) {
                tracing::debug!("[FileSystemStore] Ignoring non-session file {:?}", path);
                continue;
            }

            match read_entries(&path).await {
                Ok(entries) => {
                    if let Some(summary) = SessionSummary::from_transcript(session_id, &entries) {
                        sessions.push(summary);
                    }
                }
                Err(e) => {
                    tracing::warn!("[FileSystemStore] Skipping unreadable session file: {}", e);
                }
            }
        }

        tracing::debug!("[FileSystemStore] Listed {} sessions", sessions.len());
        Ok(sessions)
    }

    async fn delete(&self, session_id: &str) -> ChatResult<bool> {
        let path = self.session_path(session_id);
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("[FileSystemStore] Deleted session '{}' at {:?}", session_id, path);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ChatError::io(&path, e)),
        }
    }
}
