//! Server-rendered chat page.
//!
//! The page lives in `templates/chat.html` and is compiled into the binary.
//! Tera autoescapes every value; only `messages[].html`, which the formatter
//! has already escaped, is marked `safe`.

use crate::pagination::DisplayMessage;
use crate::storage::SessionSummary;
use serde::Serialize;
use tera::{Context, Tera};

const CHAT_TEMPLATE: &str = "chat.html";

#[derive(Debug, Serialize)]
pub struct ChatPage<'a> {
    pub session_id: &'a str,
    pub messages: &'a [DisplayMessage],
    /// Transcript entries already on the page; the first `load_more` offset.
    pub shown_entries: usize,
    pub sessions: &'a [SessionSummary],
    pub error: Option<&'a str>,
}

/// Tera engine holding the chat page template.
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(CHAT_TEMPLATE, include_str!("../../templates/chat.html"))?;
        Ok(Self { tera })
    }

    pub fn render_chat(&self, page: &ChatPage<'_>) -> Result<String, tera::Error> {
        let context = Context::from_serialize(page)?;
        self.tera.render(CHAT_TEMPLATE, &context)
    }
}
