use crate::config::LLMConfig;
use crate::core::error::{ChatError, ChatResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const ROLE_USER: &str = "user";
pub const ROLE_MODEL: &str = "model";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_MODEL.to_string(),
            content: content.into(),
        }
    }
}

/// A live conversational context with the remote model. The remote side
/// only sees what the handle sends, so the handle carries the history.
#[async_trait]
pub trait Conversation: Send + Sync {
    /// Send one user message and return the model's reply text.
    async fn send(&self, message: &str) -> ChatResult<String>;

    /// Turns exchanged (or seeded) so far, oldest first.
    async fn history(&self) -> Vec<ChatMessage>;
}

/// Opens conversations with the remote model.
pub trait ModelClient: Send + Sync {
    fn start_conversation(&self, history: Vec<ChatMessage>) -> Arc<dyn Conversation>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    settings: LLMConfig,
}

impl GeminiClient {
    pub fn new(api_key: String, settings: LLMConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.timeout_secs)
    }

    /// One stateless `generateContent` call over the given turns.
    pub async fn generate(&self, messages: &[ChatMessage]) -> ChatResult<String> {
        let request = GenerateContentRequest {
            contents: messages
                .iter()
                .map(|m| Content {
                    role: &m.role,
                    parts: vec![Part { text: &m.content }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("[GeminiClient] HTTP request failed: {}", e);
                ChatError::RemoteCall(format!("HTTP request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                "[GeminiClient] API returned error status {}: {}",
                status,
                error_text
            );
            return Err(ChatError::RemoteCall(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let body = response.json::<GenerateContentResponse>().await.map_err(|e| {
            tracing::warn!("[GeminiClient] Failed to decode response body: {}", e);
            ChatError::RemoteCall(format!("Response decode error: {}", e))
        })?;

        extract_text(body)
    }
}

fn extract_text(body: GenerateContentResponse) -> ChatResult<String> {
    if let Some(err) = body.error {
        return Err(ChatError::RemoteCall(err.message));
    }

    let candidate = body
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| ChatError::RemoteCall("response contained no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "unknown".to_string());
        return Err(ChatError::RemoteCall(format!(
            "response contained no text (finish reason: {})",
            reason
        )));
    }

    Ok(text)
}

impl ModelClient for GeminiClient {
    fn start_conversation(&self, history: Vec<ChatMessage>) -> Arc<dyn Conversation> {
        Arc::new(GeminiConversation {
            client: self.clone(),
            history: Mutex::new(history),
        })
    }
}

/// Multi-turn chat over [`GeminiClient`]. The history lock is held for the
/// whole call, so sends on one handle are serialized.
pub struct GeminiConversation {
    client: GeminiClient,
    history: Mutex<Vec<ChatMessage>>,
}

#[async_trait]
impl Conversation for GeminiConversation {
    async fn send(&self, message: &str) -> ChatResult<String> {
        let mut history = self.history.lock().await;

        let mut turns = history.clone();
        turns.push(ChatMessage::user(message));

        let deadline = self.client.timeout();
        let reply = tokio::time::timeout(deadline, self.client.generate(&turns))
            .await
            .map_err(|_| {
                tracing::warn!("[GeminiConversation] Remote call timed out after {:?}", deadline);
                ChatError::Timeout(deadline)
            })??;

        // A failed call leaves the history untouched.
        history.push(ChatMessage::user(message));
        history.push(ChatMessage::model(reply.clone()));
        Ok(reply)
    }

    async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }
}
