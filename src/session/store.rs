use std::collections::HashMap;

use super::conversation::Conversation;

/// In-memory conversation store, owned by one manager.
///
/// Nothing is persisted; dropping the store drops every conversation.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, conversation: Conversation) {
        self.conversations.insert(conversation.key.clone(), conversation);
    }

    pub fn get(&self, key: &str) -> Option<&Conversation> {
        self.conversations.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Conversation> {
        self.conversations.get_mut(key)
    }

    /// Get the conversation under `key`, creating it with `create` if missing
    pub fn get_or_insert_with(
        &mut self,
        key: &str,
        create: impl FnOnce() -> Conversation,
    ) -> &mut Conversation {
        self.conversations
            .entry(key.to_string())
            .or_insert_with(create)
    }

    pub fn remove(&mut self, key: &str) -> Option<Conversation> {
        self.conversations.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.values()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
