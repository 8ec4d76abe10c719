// Gateway module for transport - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod error;
mod health;
mod http;
mod traits;
mod types;

// Public re-exports - the ONLY way to access transport functionality
pub use error::TransportError;
pub use health::HealthReport;
pub use http::HttpTransport;
pub use traits::ChatTransport;
pub use types::{decode_reply, ChatModule, ChatReply, ChatRequest};

#[cfg(test)]
pub use traits::MockChatTransport;
