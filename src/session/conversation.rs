use serde::Serialize;
use std::collections::HashSet;

use super::message::Message;
use crate::constants::{UNTITLED_KEY_CHARS, UNTITLED_PREFIX};
use crate::transport::ChatModule;
use crate::utils::{single_line, truncate_chars};

/// Request lifecycle of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Idle,
    AwaitingReply,
}

/// Cached link to the session the remote service keeps for a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    pub session_id: String,
    pub bound_at_ms: i64,
}

/// One row of the conversation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    pub key: String,
    pub title: String,
    pub last_message_snippet: String,
    pub last_timestamp_ms: i64,
}

/// A local conversation and everything the client knows about it
#[derive(Debug, Clone)]
pub struct Conversation {
    pub key: String,
    /// Insertion order is creation order
    pub messages: Vec<Message>,
    pub binding: Option<SessionBinding>,
    pub state: ConversationState,
    pub module: ChatModule,
    pub created_at_ms: i64,
}

impl Conversation {
    pub fn new(key: impl Into<String>, module: ChatModule, now_ms: i64) -> Self {
        Self {
            key: key.into(),
            messages: Vec::new(),
            binding: None,
            state: ConversationState::Idle,
            module,
            created_at_ms: now_ms,
        }
    }

    /// Seed the history with a system greeting (blank greetings are ignored)
    pub fn with_greeting(mut self, greeting: Option<&str>) -> Self {
        if let Some(text) = greeting.map(str::trim).filter(|t| !t.is_empty()) {
            self.messages.push(Message::system(text, self.created_at_ms));
        }
        self
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.state == ConversationState::AwaitingReply
    }

    /// True when an identical user message was recorded less than
    /// `window_ms` before `now_ms`
    pub fn has_recent_duplicate(&self, text: &str, now_ms: i64, window_ms: i64) -> bool {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.is_user() && m.content == text)
            .any(|m| now_ms - m.timestamp_ms < window_ms)
    }

    /// Record a user message unless it duplicates a recent one.
    /// Returns whether anything was appended.
    pub fn push_user_message(&mut self, text: &str, now_ms: i64, window_ms: i64) -> bool {
        if self.has_recent_duplicate(text, now_ms, window_ms) {
            return false;
        }
        self.messages.push(Message::user(text, now_ms));
        true
    }

    /// Enter `AwaitingReply` and append the pending placeholder.
    /// Returns the placeholder id.
    pub fn begin_reply(&mut self, now_ms: i64) -> String {
        let placeholder = Message::placeholder(now_ms);
        let id = placeholder.id.clone();
        self.messages.push(placeholder);
        self.state = ConversationState::AwaitingReply;
        id
    }

    /// Existing session id, or bind `fresh_id` if there is none yet
    pub fn bind_session(&mut self, fresh_id: impl FnOnce() -> String, now_ms: i64) -> String {
        self.binding
            .get_or_insert_with(|| SessionBinding {
                session_id: fresh_id(),
                bound_at_ms: now_ms,
            })
            .session_id
            .clone()
    }

    /// Adopt the session id the server answered with.
    /// Returns true when the binding actually changed.
    pub fn rotate_session(&mut self, session_id: &str, now_ms: i64) -> bool {
        match &self.binding {
            Some(binding) if binding.session_id == session_id => false,
            _ => {
                self.binding = Some(SessionBinding {
                    session_id: session_id.to_string(),
                    bound_at_ms: now_ms,
                });
                true
            }
        }
    }

    /// True while the placeholder `placeholder_id` still waits for its reply
    pub fn has_pending(&self, placeholder_id: &str) -> bool {
        self.messages
            .iter()
            .any(|m| m.pending && m.id == placeholder_id)
    }

    /// Turn the placeholder into the final system message and go back to
    /// `Idle`. Returns `None` and leaves everything untouched when the
    /// placeholder is gone, e.g. the conversation was recreated under the
    /// same key while the request was in flight.
    pub fn complete_reply(
        &mut self,
        placeholder_id: &str,
        content: &str,
        now_ms: i64,
    ) -> Option<String> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.pending && m.id == placeholder_id)?;
        message.content = content.to_string();
        message.timestamp_ms = now_ms;
        message.pending = false;
        let id = message.id.clone();
        self.state = ConversationState::Idle;
        Some(id)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.session_id.as_str())
    }

    /// Messages sorted by timestamp (ties keep insertion order), first
    /// occurrence wins for repeated ids
    pub fn history(&self) -> Vec<Message> {
        let mut seen = HashSet::new();
        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| seen.insert(m.id.as_str()))
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp_ms);
        messages
    }

    /// First user message cut to `max_chars`, or a placeholder naming the key
    pub fn title(&self, max_chars: usize) -> String {
        match self.messages.iter().find(|m| m.is_user()) {
            Some(first) => truncate_chars(&single_line(&first.content), max_chars),
            None => format!(
                "{} {}",
                UNTITLED_PREFIX,
                self.key.chars().take(UNTITLED_KEY_CHARS).collect::<String>()
            ),
        }
    }

    pub fn summary(&self, title_max_chars: usize, snippet_max_chars: usize) -> ConversationSummary {
        let last = self
            .messages
            .iter()
            .filter(|m| !m.pending)
            .max_by_key(|m| m.timestamp_ms);

        ConversationSummary {
            key: self.key.clone(),
            title: self.title(title_max_chars),
            last_message_snippet: last
                .map(|m| truncate_chars(&single_line(&m.content), snippet_max_chars))
                .unwrap_or_default(),
            last_timestamp_ms: last.map_or(self.created_at_ms, |m| m.timestamp_ms),
        }
    }
}
