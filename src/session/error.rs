use thiserror::Error;

/// Reasons a send is refused before anything is recorded or sent
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("message is empty")]
    Validation,

    #[error("conversation {0} is still waiting for a reply")]
    ConcurrentRequest(String),
}
