//! Axum HTTP surface for the chat UI.
//!
//! Routes:
//! - `GET /` redirects to a fresh chat
//! - `GET|POST /chat?session_id=` renders a session (POST sends a message)
//! - `GET /reset` drops the cookie session and starts over
//! - `GET /load_more?session_id=&offset=` pages older turns as JSON
//! - `GET /health` liveness

mod handlers;
mod page;

use crate::config::{ServerConfig, SessionConfig};
use crate::core::error::{ChatError, ChatResult};
use crate::session::ChatService;
use anyhow::{Context, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use handlers::{ChatQuery, LoadMoreQuery, LoadMoreResponse, MessageForm};
pub use page::{ChatPage, PageRenderer};

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    /// Entries on the initial chat page.
    pub page_size: usize,
    /// Entries per `load_more` call.
    pub batch_size: usize,
    pub pages: Arc<PageRenderer>,
}

impl AppState {
    pub fn new(service: Arc<ChatService>, sessions: &SessionConfig) -> ChatResult<Self> {
        Ok(Self {
            service,
            page_size: sessions.page_size,
            batch_size: sessions.batch_size,
            pages: Arc::new(PageRenderer::new()?),
        })
    }
}

impl ChatError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::Io { .. } | ChatError::Corrupt { .. } | ChatError::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ChatError::RemoteCall(_) => StatusCode::BAD_GATEWAY,
            ChatError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ChatError::InvalidSessionId(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Server] Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::handle_index))
        .route(
            "/chat",
            get(handlers::handle_chat_view).post(handlers::handle_chat_send),
        )
        .route("/reset", get(handlers::handle_reset))
        .route("/load_more", get(handlers::handle_load_more))
        .route("/health", get(handlers::handle_health))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_secs),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl+C.
pub async fn run(state: AppState, server: &ServerConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .context("Invalid server host/port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("[Server] Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state, server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("[Server] Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("[Server] Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
