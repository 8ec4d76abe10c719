use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::error::TransportError;

/// Feature module a conversation is routed to.
///
/// Each module is a different agent behind the same service; they differ
/// only in route and in the name of the text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatModule {
    /// Shipping-fee insurance agent (LangGraph)
    #[default]
    ShippingFee,
    /// Plain LLM question answering
    Assistant,
}

impl ChatModule {
    pub const ALL: [ChatModule; 2] = [ChatModule::ShippingFee, ChatModule::Assistant];

    /// Route below the API prefix
    pub fn route(&self) -> &'static str {
        match self {
            Self::ShippingFee => "/agents/shipping-fee/chat",
            Self::Assistant => "/llm/question",
        }
    }

    /// JSON field carrying the user text
    pub fn text_field(&self) -> &'static str {
        match self {
            Self::ShippingFee => "content",
            Self::Assistant => "question",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShippingFee => "shipping-fee",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatModule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shipping-fee" | "shipping_fee" | "shipping" => Ok(Self::ShippingFee),
            "assistant" | "llm" | "question" => Ok(Self::Assistant),
            other => Err(format!(
                "Unknown module '{}'. Expected one of: shipping-fee, assistant",
                other
            )),
        }
    }
}

/// One outgoing chat request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub module: ChatModule,
    pub text: String,
    pub session_id: String,
    pub user_id: String,
    /// Correlates client and server logs; sent as a header
    pub trace_id: String,
}

impl ChatRequest {
    /// JSON body in the shape the service expects
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "session_id": self.session_id,
            "user_id": self.user_id,
        });
        body[self.module.text_field()] = json!(self.text);
        body
    }
}

/// Decoded successful reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    reply: String,
    session_id: String,
}

/// Decode a raw HTTP status + body into a reply.
///
/// Anything other than 2xx carrying `{reply, session_id}` with a non-blank
/// session id is a `TransportError`.
pub fn decode_reply(status: u16, body: &str) -> Result<ChatReply, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::status(status, body));
    }

    let envelope: ReplyEnvelope = serde_json::from_str(body)
        .map_err(|e| TransportError::Malformed(e.to_string()))?;

    if envelope.session_id.trim().is_empty() {
        return Err(TransportError::Malformed("empty session_id".to_string()));
    }

    Ok(ChatReply {
        reply: envelope.reply,
        session_id: envelope.session_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(module: ChatModule) -> ChatRequest {
        ChatRequest {
            module,
            text: "我想了解运费险".to_string(),
            session_id: "s1".to_string(),
            user_id: "u1".to_string(),
            trace_id: "t1".to_string(),
        }
    }

    #[test]
    fn test_shipping_fee_body_uses_content() {
        assert_eq!(
            request(ChatModule::ShippingFee).to_body(),
            json!({"content": "我想了解运费险", "session_id": "s1", "user_id": "u1"})
        );
    }

    #[test]
    fn test_assistant_body_uses_question() {
        assert_eq!(
            request(ChatModule::Assistant).to_body(),
            json!({"question": "我想了解运费险", "session_id": "s1", "user_id": "u1"})
        );
    }

    #[test]
    fn test_module_parsing() {
        assert_eq!("shipping-fee".parse::<ChatModule>(), Ok(ChatModule::ShippingFee));
        assert_eq!(" Assistant ".parse::<ChatModule>(), Ok(ChatModule::Assistant));
        assert!("order-analysis".parse::<ChatModule>().is_err());
        for module in ChatModule::ALL {
            assert_eq!(module.to_string().parse::<ChatModule>(), Ok(module));
        }
    }

    #[test]
    fn test_decode_success_ignores_extra_fields() {
        let body = r#"{"reply":"您好","session_id":"s2","created_at":"2024-01-01T00:00:00"}"#;
        assert_eq!(
            decode_reply(200, body).unwrap(),
            ChatReply {
                reply: "您好".to_string(),
                session_id: "s2".to_string()
            }
        );
    }

    #[test]
    fn test_decode_rejects_non_2xx() {
        let err = decode_reply(404, r#"{"detail":"Not Found"}"#).unwrap_err();
        assert_eq!(err.code(), "HTTP_404");
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        assert!(matches!(decode_reply(200, "<html>"), Err(TransportError::Malformed(_))));
        assert!(matches!(
            decode_reply(200, r#"{"reply":"hi"}"#),
            Err(TransportError::Malformed(_))
        ));
        assert!(matches!(
            decode_reply(200, r#"{"reply":null,"session_id":"s"}"#),
            Err(TransportError::Malformed(_))
        ));
        assert!(matches!(
            decode_reply(200, r#"{"reply":"hi","session_id":"  "}"#),
            Err(TransportError::Malformed(_))
        ));
    }
}
