use serde::Serialize;

/// Outcome flag of a send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Success,
    Error,
}

/// What the rendering layer gets back from every accepted send.
///
/// Transport failures are reported here with `status = Error`; they never
/// surface as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatResult {
    /// Reply text, or the fallback text on error
    pub reply: String,
    pub status: ChatStatus,
    pub conversation_key: String,
    /// Session the conversation is bound to after this call
    pub session_id: String,
    /// Id of the system message recording the outcome
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ChatResult {
    pub fn is_success(&self) -> bool {
        self.status == ChatStatus::Success
    }
}
