/// Session management module - Gateway

mod clock;
mod conversation;
mod error;
mod manager;
mod message;
mod result;
mod selector;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use conversation::{Conversation, ConversationState, ConversationSummary, SessionBinding};
pub use error::SendError;
pub use manager::{ChatSettings, ConversationSessionManager};
pub use message::{Message, MessageOrigin};
pub use result::{ChatResult, ChatStatus};
pub use selector::{format_timestamp, select_conversation};
pub use store::ConversationStore;
