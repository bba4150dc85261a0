use super::page::ChatPage;
use super::AppState;
use crate::core::error::ChatError;
use crate::pagination::{flatten, DisplayMessage};
use crate::session::{new_session_id, parse_session_id};
use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoadMoreQuery {
    pub session_id: String,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadMoreResponse {
    pub messages: Vec<DisplayMessage>,
}

fn redirect_to_new_chat() -> Response {
    Redirect::to(&format!("/chat?session_id={}", new_session_id())).into_response()
}

/// `None` when the query carries no (or a blank) session id.
fn session_from_query(query: &ChatQuery) -> Option<Result<String, ChatError>> {
    query
        .session_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .map(parse_session_id)
}

pub async fn handle_index() -> Redirect {
    Redirect::to("/chat")
}

/// GET /chat
pub async fn handle_chat_view(
    State(state): State<AppState>,
    Query(query): Query<ChatQuery>,
) -> Response {
    match session_from_query(&query) {
        None => redirect_to_new_chat(),
        Some(Err(e)) => e.into_response(),
        Some(Ok(session_id)) => chat_page(&state, &session_id, None).await,
    }
}

/// POST /chat
pub async fn handle_chat_send(
    State(state): State<AppState>,
    Query(query): Query<ChatQuery>,
    Form(form): Form<MessageForm>,
) -> Response {
    let session_id = match session_from_query(&query) {
        None => return redirect_to_new_chat(),
        Some(Err(e)) => return e.into_response(),
        Some(Ok(id)) => id,
    };

    if form.message.trim().is_empty() {
        return chat_page(&state, &session_id, None).await;
    }

    match state.service.send(&session_id, &form.message).await {
        Ok(_) => chat_page(&state, &session_id, None).await,
        Err(e) => chat_page(&state, &session_id, Some(&e)).await,
    }
}

async fn chat_page(state: &AppState, session_id: &str, failure: Option<&ChatError>) -> Response {
    let entries = match state.service.page(session_id, 0, state.page_size).await {
        Ok(entries) => entries,
        Err(e) => return e.into_response(),
    };
    let sessions = match state.service.sessions().await {
        Ok(sessions) => sessions,
        Err(e) => return e.into_response(),
    };

    let error = failure.map(ToString::to_string);
    let html = match state.pages.render_chat(&ChatPage {
        session_id,
        messages: &flatten(&entries),
        shown_entries: entries.len(),
        sessions: &sessions,
        error: error.as_deref(),
    }) {
        Ok(html) => html,
        Err(e) => return ChatError::from(e).into_response(),
    };

    let status = failure.map_or(StatusCode::OK, ChatError::status_code);
    (status, Html(html)).into_response()
}

/// GET /reset
pub async fn handle_reset() -> Response {
    (
        [(header::SET_COOKIE, "session=; Path=/; Max-Age=0; HttpOnly")],
        Redirect::to("/chat"),
    )
        .into_response()
}

/// GET /load_more
pub async fn handle_load_more(
    State(state): State<AppState>,
    Query(query): Query<LoadMoreQuery>,
) -> Result<Json<LoadMoreResponse>, ChatError> {
    let session_id = parse_session_id(&query.session_id)?;
    let entries = state
        .service
        .page(&session_id, query.offset, state.batch_size)
        .await?;

    tracing::debug!(
        "[Server] load_more session '{}' offset {} -> {} entries",
        session_id,
        query.offset,
        entries.len()
    );
    Ok(Json(LoadMoreResponse {
        messages: flatten(&entries),
    }))
}

/// GET /health
pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "active_sessions": state.service.registry().len().await,
    }))
}
