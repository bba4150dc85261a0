//! Windows over a session transcript, counted back from the newest entry.

use crate::format::format_response;
use crate::storage::TranscriptEntry;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Index range of the batch that ends `offset` entries before the newest
/// one: `[max(0, total - offset - batch), total - offset)`. Always within
/// `0..total`; empty once `offset >= total`.
pub fn window(total: usize, offset: usize, batch: usize) -> Range<usize> {
    let end = total.saturating_sub(offset);
    let start = end.saturating_sub(batch);
    start..end
}

pub fn page(entries: &[TranscriptEntry], offset: usize, batch: usize) -> &[TranscriptEntry] {
    &entries[window(entries.len(), offset, batch)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One chat bubble. `text` is the stored plain text, `html` its rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub sender: Sender,
    pub text: String,
    pub html: String,
    pub timestamp: String,
}

impl DisplayMessage {
    fn new(sender: Sender, text: &str, timestamp: &str) -> Self {
        Self {
            sender,
            text: text.to_string(),
            html: format_response(text),
            timestamp: timestamp.to_string(),
        }
    }
}

/// Each entry becomes a user bubble followed by a bot bubble.
pub fn flatten(entries: &[TranscriptEntry]) -> Vec<DisplayMessage> {
    entries
        .iter()
        .flat_map(|entry| {
            [
                DisplayMessage::new(Sender::User, &entry.user, &entry.timestamp),
                DisplayMessage::new(Sender::Bot, &entry.bot, &entry.timestamp),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(n: usize) -> Vec<TranscriptEntry> {
        (0..n)
            .map(|i| TranscriptEntry {
                user: format!("u{i}"),
                bot: format!("b{i}"),
                timestamp: format!("t{i}"),
            })
            .collect()
    }

    #[test]
    fn test_first_page_is_most_recent_entries() {
        let entries = transcript(45);
        let first = page(&entries, 0, 30);
        assert_eq!(first.len(), 30);
        assert_eq!(first[0].user, "u15");
        assert_eq!(first[29].user, "u44");
    }

    #[test]
    fn test_short_transcript_returns_everything() {
        let entries = transcript(4);
        assert_eq!(page(&entries, 0, 30), &entries[..]);
    }

    #[test]
    fn test_second_batch_continues_backwards() {
        let entries = transcript(45);
        let older = page(&entries, 30, 30);
        assert_eq!(older.len(), 15);
        assert_eq!(older[0].user, "u0");
        assert_eq!(older[14].user, "u14");
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let entries = transcript(10);
        assert!(page(&entries, 10, 30).is_empty());
        assert!(page(&entries, 11, 30).is_empty());
        assert!(page(&[], 0, 30).is_empty());
    }

    #[test]
    fn test_window_never_leaves_bounds() {
        for total in 0..12 {
            for offset in 0..15 {
                for batch in 0..15 {
                    let range = window(total, offset, batch);
                    assert!(range.start <= range.end);
                    assert!(range.end <= total);
                    assert_eq!(range.len(), batch.min(total.saturating_sub(offset)));
                }
            }
        }
    }

    #[test]
    fn test_flatten_alternates_user_and_bot() {
        let entries = vec![TranscriptEntry {
            user: "Hello".to_string(),
            bot: "Steps:\nfirst".to_string(),
            timestamp: "2024-01-01 10:00:00".to_string(),
        }];

        let messages = flatten(&entries);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "Hello");
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].text, "Steps:\nfirst");
        assert_eq!(messages[1].html, "<b>Steps:</b><br>first<br>");
        assert_eq!(messages[1].timestamp, "2024-01-01 10:00:00");
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
    }
}
