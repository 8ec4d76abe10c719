use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::conversation::{Conversation, ConversationState, ConversationSummary};
use super::error::SendError;
use super::message::Message;
use super::result::{ChatResult, ChatStatus};
use super::store::ConversationStore;
use crate::app::Config;
use crate::transport::{ChatModule, ChatRequest, ChatTransport};

/// Knobs the manager needs, lifted out of `Config`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub user_id: String,
    pub default_module: ChatModule,
    pub greeting: Option<String>,
    pub duplicate_window_ms: i64,
    pub fallback_reply: String,
    pub title_max_chars: usize,
    pub snippet_max_chars: usize,
}

impl From<&Config> for ChatSettings {
    fn from(config: &Config) -> Self {
        Self {
            user_id: config.chat.user_id.clone(),
            default_module: config.chat.default_module,
            greeting: config.chat.greeting.clone(),
            duplicate_window_ms: config.chat.duplicate_window_ms,
            fallback_reply: config.chat.fallback_reply.clone(),
            title_max_chars: config.ui.title_max_chars,
            snippet_max_chars: config.ui.snippet_max_chars,
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Mediates between "send this" intents and the remote chat service.
///
/// Owns the conversation store. Each conversation is `Idle` or
/// `AwaitingReply`; only an `Idle` conversation accepts a send, so at most
/// one request per conversation is ever in flight while different
/// conversations proceed independently. The store lock is never held
/// across the network call.
pub struct ConversationSessionManager {
    store: Mutex<ConversationStore>,
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    settings: ChatSettings,
}

impl ConversationSessionManager {
    pub fn new(transport: Arc<dyn ChatTransport>, settings: ChatSettings) -> Self {
        Self::with_clock(transport, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        transport: Arc<dyn ChatTransport>,
        settings: ChatSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: Mutex::new(ConversationStore::new()),
            transport,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Where requests go, for display
    pub fn endpoint(&self) -> String {
        self.transport.describe()
    }

    fn new_conversation(&self, key: &str) -> Conversation {
        Conversation::new(key, self.settings.default_module, self.clock.now_ms())
            .with_greeting(self.settings.greeting.as_deref())
    }

    /// Start an empty (or greeted) conversation and return its key
    pub fn create_conversation(&self) -> String {
        let key = Uuid::new_v4().to_string();
        let conversation = self.new_conversation(&key);
        self.store.lock().insert(conversation);
        info!(conversation = %key, "Created conversation");
        key
    }

    /// Send `text` in conversation `key`.
    ///
    /// Blank text and sends into a conversation that is still awaiting a
    /// reply are rejected without touching anything. Every accepted send
    /// ends with exactly one new system message: the reply, or the fallback
    /// text when the transport fails. Unknown keys are created on demand.
    pub async fn send_message(&self, key: &str, text: &str) -> Result<ChatResult, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::Validation);
        }

        let (request, placeholder_id) = {
            let mut store = self.store.lock();
            let now = self.clock.now_ms();
            let conversation = store.get_or_insert_with(key, || self.new_conversation(key));

            if conversation.is_awaiting_reply() {
                debug!(conversation = %key, "Send rejected, reply still pending");
                return Err(SendError::ConcurrentRequest(key.to_string()));
            }

            if !conversation.push_user_message(text, now, self.settings.duplicate_window_ms) {
                debug!(conversation = %key, "Duplicate submission, user message not re-recorded");
            }
            let placeholder_id = conversation.begin_reply(now);
            let session_id = conversation.bind_session(|| Uuid::new_v4().to_string(), now);

            let request = ChatRequest {
                module: conversation.module,
                text: text.to_string(),
                session_id,
                user_id: self.settings.user_id.clone(),
                trace_id: Uuid::new_v4().to_string(),
            };
            (request, placeholder_id)
        };

        debug!(
            conversation = %key,
            module = %request.module,
            session_id = %request.session_id,
            trace_id = %request.trace_id,
            "Awaiting reply"
        );
        let outcome = self.transport.send(&request).await;

        let mut store = self.store.lock();
        let now = self.clock.now_ms();
        // A conversation deleted (and maybe recreated under the same key)
        // no longer holds this placeholder
        let conversation = store
            .get_mut(key)
            .filter(|conv| conv.has_pending(&placeholder_id));
        if conversation.is_none() {
            debug!(conversation = %key, "Conversation deleted while awaiting reply, outcome dropped");
        }

        match outcome {
            Ok(reply) => {
                let message_id = match conversation {
                    Some(conv) => {
                        if conv.rotate_session(&reply.session_id, now) {
                            warn!(
                                conversation = %key,
                                from = %request.session_id,
                                to = %reply.session_id,
                                "Server rotated session"
                            );
                        }
                        conv.complete_reply(&placeholder_id, &reply.reply, now)
                            .unwrap_or(placeholder_id)
                    }
                    None => placeholder_id,
                };

                Ok(ChatResult {
                    reply: reply.reply,
                    status: ChatStatus::Success,
                    conversation_key: key.to_string(),
                    session_id: reply.session_id,
                    message_id,
                    error_code: None,
                    error_message: None,
                })
            }
            Err(err) => {
                warn!(
                    conversation = %key,
                    trace_id = %request.trace_id,
                    code = %err.code(),
                    "Chat request failed: {}",
                    err
                );
                let fallback = self.settings.fallback_reply.clone();
                let message_id = match conversation {
                    Some(conv) => conv
                        .complete_reply(&placeholder_id, &fallback, now)
                        .unwrap_or(placeholder_id),
                    None => placeholder_id,
                };

                Ok(ChatResult {
                    reply: fallback,
                    status: ChatStatus::Error,
                    conversation_key: key.to_string(),
                    session_id: request.session_id,
                    message_id,
                    error_code: Some(err.code()),
                    error_message: Some(err.to_string()),
                })
            }
        }
    }

    /// Sorted, id-deduplicated snapshot of a conversation's messages.
    /// Unknown keys yield an empty history.
    pub fn get_history(&self, key: &str) -> Vec<Message> {
        self.store
            .lock()
            .get(key)
            .map(Conversation::history)
            .unwrap_or_default()
    }

    /// Drop a conversation and its session binding
    pub fn delete_conversation(&self, key: &str) -> bool {
        let removed = self.store.lock().remove(key).is_some();
        if removed {
            info!(conversation = %key, "Deleted conversation");
        }
        removed
    }

    /// Conversations, most recently active first
    pub fn list_conversations(&self) -> Vec<ConversationSummary> {
        let mut summaries: Vec<ConversationSummary> = self
            .store
            .lock()
            .iter()
            .map(|c| c.summary(self.settings.title_max_chars, self.settings.snippet_max_chars))
            .collect();
        summaries.sort_by(|a, b| {
            b.last_timestamp_ms
                .cmp(&a.last_timestamp_ms)
                .then_with(|| a.key.cmp(&b.key))
        });
        summaries
    }

    /// Route later sends of a conversation to another module
    pub fn set_module(&self, key: &str, module: ChatModule) -> bool {
        match self.store.lock().get_mut(key) {
            Some(conversation) => {
                conversation.module = module;
                debug!(conversation = %key, %module, "Switched module");
                true
            }
            None => false,
        }
    }

    pub fn module(&self, key: &str) -> Option<ChatModule> {
        self.store.lock().get(key).map(|c| c.module)
    }

    pub fn state(&self, key: &str) -> Option<ConversationState> {
        self.store.lock().get(key).map(|c| c.state)
    }

    pub fn session_id(&self, key: &str) -> Option<String> {
        self.store
            .lock()
            .get(key)
            .and_then(|c| c.session_id().map(str::to_string))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.lock().get(key).is_some()
    }
}
