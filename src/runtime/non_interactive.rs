use serde::Serialize;

use crate::{
    cli::OutputFormat,
    session::{ChatResult, ConversationSessionManager},
    utils::NativeAiError,
};

/// Result of a non-interactive run
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// The prompt that was executed
    pub prompt: String,
    /// Outcome reported by the session manager
    #[serde(flatten)]
    pub result: ChatResult,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    /// Module the prompt was routed to
    pub module: String,
    /// Service the request went to
    pub endpoint: String,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Non-interactive runner for executing single prompts
pub struct NonInteractiveRunner {
    manager: ConversationSessionManager,
}

impl NonInteractiveRunner {
    pub fn new(manager: ConversationSessionManager) -> Self {
        Self { manager }
    }

    /// Send a single prompt in a fresh conversation
    pub async fn execute(&self, prompt: String) -> Result<NonInteractiveResult, NativeAiError> {
        let start_time = std::time::Instant::now();

        let key = self.manager.create_conversation();
        let module = self
            .manager
            .module(&key)
            .unwrap_or(self.manager.settings().default_module);
        let result = self.manager.send_message(&key, &prompt).await?;

        Ok(NonInteractiveResult {
            prompt,
            result,
            metadata: ExecutionMetadata {
                module: module.to_string(),
                endpoint: self.manager.endpoint(),
                duration_ms: start_time.elapsed().as_millis(),
            },
        })
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = result.result.reply.clone();
                if let Some(code) = &result.result.error_code {
                    output.push_str(&format!("\n\n--- Error ---\n{}", code));
                    if let Some(message) = &result.result.error_message {
                        output.push_str(&format!(": {}", message));
                    }
                }
                output
            }
            OutputFormat::Markdown => {
                let mut output = String::new();

                output.push_str("## Response\n\n");
                output.push_str(&result.result.reply);
                output.push_str("\n\n");

                if let Some(code) = &result.result.error_code {
                    output.push_str("## Error\n\n");
                    output.push_str(&format!(
                        "- **{}**: {}\n\n",
                        code,
                        result.result.error_message.as_deref().unwrap_or("")
                    ));
                }

                output.push_str("---\n");
                output.push_str(&format!(
                    "*Module: {} | Session: {} | Duration: {}ms*\n",
                    result.metadata.module, result.result.session_id, result.metadata.duration_ms
                ));

                output
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ChatSettings, SendError};
    use crate::transport::{ChatReply, MockChatTransport, TransportError};
    use std::sync::Arc;

    fn runner(mock: MockChatTransport) -> NonInteractiveRunner {
        NonInteractiveRunner::new(ConversationSessionManager::new(
            Arc::new(mock),
            ChatSettings::default(),
        ))
    }

    #[tokio::test]
    async fn test_success_formats() {
        let mut mock = MockChatTransport::new();
        mock.expect_send().returning(|_| {
            Ok(ChatReply {
                reply: "运费险按订单金额计算".to_string(),
                session_id: "s-42".to_string(),
            })
        });
        mock.expect_describe()
            .return_const("http://localhost:8000/nativeai".to_string());
        let runner = runner(mock);

        let result = runner.execute("运费险怎么算".to_string()).await.unwrap();
        assert!(result.result.is_success());
        assert_eq!(result.metadata.module, "shipping-fee");

        let text = runner.format_result(&result, OutputFormat::Text);
        assert_eq!(text, "运费险按订单金额计算");

        let json: serde_json::Value =
            serde_json::from_str(&runner.format_result(&result, OutputFormat::Json)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["session_id"], "s-42");
        assert_eq!(json["prompt"], "运费险怎么算");
        assert!(json.get("error_code").is_none());

        let markdown = runner.format_result(&result, OutputFormat::Markdown);
        assert!(markdown.starts_with("## Response"));
        assert!(markdown.contains("Session: s-42"));
    }

    #[tokio::test]
    async fn test_failure_formats() {
        let mut mock = MockChatTransport::new();
        mock.expect_send()
            .returning(|_| Err(TransportError::Timeout("after 120s".to_string())));
        mock.expect_describe().return_const("mock".to_string());
        let runner = runner(mock);

        let result = runner.execute("hi".to_string()).await.unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&runner.format_result(&result, OutputFormat::Json)).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_code"], "TIMEOUT");

        let text = runner.format_result(&result, OutputFormat::Text);
        assert!(text.contains("--- Error ---\nTIMEOUT"));
    }

    #[tokio::test]
    async fn test_blank_prompt_is_an_error() {
        let mut mock = MockChatTransport::new();
        mock.expect_send().never();
        let err = runner(mock).execute("  ".to_string()).await.unwrap_err();
        assert!(matches!(err, NativeAiError::SendError(SendError::Validation)));
    }
}
