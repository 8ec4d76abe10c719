use thiserror::Error;

use crate::constants::ERROR_BODY_MAX_CHARS;
use crate::utils::truncate_chars;

/// Failure talking to the chat endpoint.
///
/// Every variant is absorbed by the session manager and turned into the
/// fallback reply; callers of the transport itself still see it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Stable machine-readable code surfaced in `ChatResult`
    pub fn code(&self) -> String {
        match self {
            Self::Timeout(_) => "TIMEOUT".to_string(),
            Self::Network(_) => "NETWORK_ERROR".to_string(),
            Self::Status { status, .. } => format!("HTTP_{}", status),
            Self::Malformed(_) => "MALFORMED_RESPONSE".to_string(),
        }
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: truncate_chars(body.trim(), ERROR_BODY_MAX_CHARS),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(TransportError::Timeout("t".into()).code(), "TIMEOUT");
        assert_eq!(TransportError::Network("n".into()).code(), "NETWORK_ERROR");
        assert_eq!(TransportError::status(502, "bad gateway").code(), "HTTP_502");
        assert_eq!(TransportError::Malformed("m".into()).code(), "MALFORMED_RESPONSE");
    }

    #[test]
    fn test_status_body_is_trimmed_and_capped() {
        let body = format!("  {}  ", "x".repeat(500));
        match TransportError::status(500, &body) {
            TransportError::Status { status, body } => {
                assert_eq!(status, 500);
                assert!(body.starts_with('x'));
                assert_eq!(body.chars().count(), ERROR_BODY_MAX_CHARS + 3);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
