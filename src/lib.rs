//! Chatrelay - web chat relay to a generative-language API
//!
//! Messages posted to the chat UI are forwarded to the remote model through
//! a per-session conversation handle, and every turn is appended to a JSON
//! transcript file named after the session.

pub mod cli;
pub mod config;
pub mod core;
pub mod format;
pub mod pagination;
pub mod server;
pub mod session;
pub mod storage;
pub mod utils;

pub use crate::config::Settings;
pub use crate::core::{ChatError, ChatResult};
pub use crate::session::ChatService;

use crate::config::StorageBackend;
use crate::core::llm::ModelClient;
use crate::session::SessionRegistry;
use crate::storage::{FileSystemStore, InMemoryStore, TranscriptStore};
use std::sync::Arc;

/// Open the transcript store selected by `storage.backend`.
pub async fn open_store(settings: &Settings) -> ChatResult<Arc<dyn TranscriptStore>> {
    match settings.storage.backend {
        StorageBackend::File => Ok(Arc::new(
            FileSystemStore::new(settings.storage.log_dir.clone()).await?,
        )),
        StorageBackend::Memory => {
            tracing::warn!("Transcripts are kept in memory and lost on exit");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

/// Wire the configured store, the registry and the service together.
pub async fn build_service(
    settings: &Settings,
    client: Arc<dyn ModelClient>,
) -> ChatResult<ChatService> {
    let store = open_store(settings).await?;

    let registry = SessionRegistry::new(
        client,
        store.clone(),
        settings.sessions.resume,
        settings.sessions.capacity,
    );

    tracing::info!(
        "Chatrelay service ready ({:?} transcripts in {:?}, resume mode {:?})",
        settings.storage.backend,
        settings.storage.log_dir,
        settings.sessions.resume
    );
    Ok(ChatService::new(Arc::new(registry), store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::ScriptedClient;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_backend_leaves_log_dir_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.storage.backend = StorageBackend::Memory;
        settings.storage.log_dir = temp_dir.path().join("chat_logs");

        let service = build_service(&settings, Arc::new(ScriptedClient::replying("ok")))
            .await
            .unwrap();
        service.send("s", "Hello").await.unwrap();

        assert_eq!(service.transcript("s").await.unwrap().len(), 1);
        assert!(!settings.storage.log_dir.exists());
    }

    #[tokio::test]
    async fn test_file_backend_creates_log_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.storage.log_dir = temp_dir.path().join("chat_logs");

        open_store(&settings).await.unwrap();
        assert!(settings.storage.log_dir.is_dir());
    }
}
