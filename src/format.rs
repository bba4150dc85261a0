//! Plain text to chat-bubble HTML.
//!
//! Stored transcripts hold plain text; this is applied at render time, the
//! same way for the chat page and for `load_more`.

pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape, then mark up line by line: blank lines become `<br>`, lines
/// ending in `:` are bolded, everything else is emitted trimmed with a `<br>`.
pub fn format_response(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 16);
    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            html.push_str("<br>");
        } else if line.ends_with(':') {
            html.push_str("<b>");
            html.push_str(&escape_html(line));
            html.push_str("</b><br>");
        } else {
            html.push_str(&escape_html(line));
            html.push_str("<br>");
        }
    }
    html
}
