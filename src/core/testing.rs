//! Scripted model client for unit tests.

use crate::core::error::{ChatError, ChatResult};
use crate::core::llm::{ChatMessage, Conversation, ModelClient};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Replies with a fixed text (or fails when `reply` is `None`) and counts
/// conversations started and messages sent.
pub(crate) struct ScriptedClient {
    reply: Option<String>,
    pub(crate) started: AtomicUsize,
    pub(crate) sends: Arc<AtomicUsize>,
}

impl ScriptedClient {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            started: AtomicUsize::new(0),
            sends: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            started: AtomicUsize::new(0),
            sends: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub(crate) fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

impl ModelClient for ScriptedClient {
    fn start_conversation(&self, history: Vec<ChatMessage>) -> Arc<dyn Conversation> {
        self.started.fetch_add(1, Ordering::SeqCst);
        Arc::new(ScriptedConversation {
            reply: self.reply.clone(),
            sends: self.sends.clone(),
            history: Mutex::new(history),
        })
    }
}

struct ScriptedConversation {
    reply: Option<String>,
    sends: Arc<AtomicUsize>,
    history: Mutex<Vec<ChatMessage>>,
}

#[async_trait]
impl Conversation for ScriptedConversation {
    async fn send(&self, message: &str) -> ChatResult<String> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .reply
            .clone()
            .ok_or_else(|| ChatError::RemoteCall("API error 429: quota exceeded".to_string()))?;
        let mut history = self.history.lock().await;
        history.push(ChatMessage::user(message));
        history.push(ChatMessage::model(reply.clone()));
        Ok(reply)
    }

    async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }
}
