pub mod registry;
pub mod service;

pub use registry::{Handle, SessionRegistry};
pub use service::{is_farewell, ChatService, FAREWELL};

use crate::core::error::{ChatError, ChatResult};
use uuid::Uuid;

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Session ids name files on disk, so only UUIDs are accepted. Returns the
/// canonical lowercase hyphenated form.
pub fn parse_session_id(raw: &str) -> ChatResult<String> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| ChatError::InvalidSessionId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_id_is_v4() {
        let id = new_session_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_parse_session_id_canonicalizes() {
        let id = parse_session_id("6F9619FF-8B86-4D11-B42D-00C04FC964FF").unwrap();
        assert_eq!(id, "6f9619ff-8b86-4d11-b42d-00c04fc964ff");
    }

    #[test]
    fn test_parse_session_id_rejects_paths() {
        assert!(matches!(
            parse_session_id("../../etc/passwd"),
            Err(ChatError::InvalidSessionId(_))
        ));
        assert!(parse_session_id("").is_err());
    }
}
