use async_trait::async_trait;

use super::error::TransportError;
use super::types::{ChatReply, ChatRequest};

/// The remote chat service as seen by the session manager
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one request and wait for the decoded reply
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError>;

    /// Human-readable description of where requests go
    fn describe(&self) -> String;
}
