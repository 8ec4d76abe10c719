use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageOrigin {
    User,
    System,
}

/// One entry in a conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique within its conversation
    pub id: String,
    pub content: String,
    pub origin: MessageOrigin,
    /// Wall clock, milliseconds since the epoch
    pub timestamp_ms: i64,
    /// Placeholder for a reply that hasn't arrived yet
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

impl Message {
    pub fn new(origin: MessageOrigin, content: impl Into<String>, timestamp_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            origin,
            timestamp_ms,
            pending: false,
        }
    }

    pub fn user(content: impl Into<String>, timestamp_ms: i64) -> Self {
        Self::new(MessageOrigin::User, content, timestamp_ms)
    }

    pub fn system(content: impl Into<String>, timestamp_ms: i64) -> Self {
        Self::new(MessageOrigin::System, content, timestamp_ms)
    }

    /// Empty system message standing in for an outstanding reply
    pub fn placeholder(timestamp_ms: i64) -> Self {
        Self {
            pending: true,
            ..Self::system(String::new(), timestamp_ms)
        }
    }

    pub fn is_user(&self) -> bool {
        self.origin == MessageOrigin::User
    }
}
