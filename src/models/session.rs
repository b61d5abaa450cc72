use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Recommendation;

/// Author of one conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in a session's transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Server-side conversational context for one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    /// Refreshed on every turn; sessions idle past the store's threshold
    /// are evicted by the janitor sweep.
    pub last_updated: DateTime<Utc>,
    /// Most recent retrieval set only, overwritten wholesale on each new
    /// recommendation request. Ordinal references resolve against this list.
    pub recent_recommendations: Vec<Recommendation>,
    /// Append-only transcript. Unbounded: grows until the session is
    /// evicted for idleness.
    pub conversation_history: Vec<ChatMessage>,
}

impl Session {
    /// Creates an empty session stamped with the current time
    pub fn new(id: String) -> Self {
        Self {
            id,
            last_updated: Utc::now(),
            recent_recommendations: Vec::new(),
            conversation_history: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new("abc".to_string());
        assert_eq!(session.id, "abc");
        assert!(session.recent_recommendations.is_empty());
        assert!(session.conversation_history.is_empty());
    }

    #[test]
    fn test_chat_role_serialization() {
        let user = serde_json::to_string(&ChatRole::User).unwrap();
        let assistant = serde_json::to_string(&ChatRole::Assistant).unwrap();
        assert_eq!(user, "\"user\"");
        assert_eq!(assistant, "\"assistant\"");
    }

    #[test]
    fn test_message_constructors() {
        let message = ChatMessage::user("hi");
        assert_eq!(message.role, ChatRole::User);
        assert_eq!(message.content, "hi");
        assert_eq!(ChatMessage::assistant("ok").role, ChatRole::Assistant);
    }
}
