use thiserror::Error;

use crate::session::SendError;

/// Main error type for the NativeAI client
#[derive(Error, Debug)]
pub enum NativeAiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Send rejected: {0}")]
    SendError(#[from] SendError),
}
