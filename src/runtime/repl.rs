use anyhow::Result;
use colored::Colorize;
use std::io::Write;

use super::commands::{ReplCommand, HELP_TEXT};
use crate::session::{
    format_timestamp, select_conversation, ChatResult, ConversationSessionManager, MessageOrigin,
    SendError,
};

/// Whether the REPL keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented rendering layer on top of the session manager
pub struct ChatRepl {
    manager: ConversationSessionManager,
    current: String,
}

impl ChatRepl {
    /// Start with one fresh conversation selected
    pub fn new(manager: ConversationSessionManager) -> Self {
        let current = manager.create_conversation();
        Self { manager, current }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn manager(&self) -> &ConversationSessionManager {
        &self.manager
    }

    /// Print the history of the current conversation (greeting included)
    pub fn print_history(&self, out: &mut impl Write) -> Result<()> {
        for message in self.manager.get_history(&self.current) {
            if message.pending {
                writeln!(out, "{}", "…".dimmed())?;
                continue;
            }
            match message.origin {
                MessageOrigin::User => writeln!(out, "{} {}", "you>".cyan().bold(), message.content)?,
                MessageOrigin::System => writeln!(out, "{} {}", "ai>".green().bold(), message.content)?,
            }
        }
        Ok(())
    }

    pub fn prompt(&self) -> String {
        let module = self
            .manager
            .module(&self.current)
            .unwrap_or(self.manager.settings().default_module);
        format!("[{}] > ", module)
    }

    /// Run one parsed command, writing everything user-visible to `out`
    pub async fn handle(&mut self, command: ReplCommand, out: &mut impl Write) -> Result<Flow> {
        match command {
            ReplCommand::Message(text) => {
                match self.manager.send_message(&self.current, &text).await {
                    Ok(result) => render_result(&result, out)?,
                    // Empty lines are simply ignored
                    Err(SendError::Validation) => {}
                    Err(e @ SendError::ConcurrentRequest(_)) => {
                        writeln!(out, "{}", e.to_string().yellow())?;
                    }
                }
            }
            ReplCommand::New => {
                self.current = self.manager.create_conversation();
                writeln!(out, "Started conversation {}", self.current.bold())?;
                self.print_history(out)?;
            }
            ReplCommand::List => self.print_list(out)?,
            ReplCommand::Switch(Some(prefix)) => match self.resolve_key(&prefix) {
                Ok(key) => {
                    self.current = key;
                    writeln!(out, "Switched to {}", self.current.bold())?;
                    self.print_history(out)?;
                }
                Err(reason) => writeln!(out, "{}", reason.yellow())?,
            },
            ReplCommand::Switch(None) => {
                let summaries = self.manager.list_conversations();
                let chosen = tokio::task::block_in_place(|| select_conversation(summaries))?;
                if let Some(key) = chosen {
                    self.current = key;
                    writeln!(out, "Switched to {}", self.current.bold())?;
                    self.print_history(out)?;
                }
            }
            ReplCommand::History => self.print_history(out)?,
            ReplCommand::Delete(target) => {
                let key = match target {
                    Some(prefix) => match self.resolve_key(&prefix) {
                        Ok(key) => key,
                        Err(reason) => {
                            writeln!(out, "{}", reason.yellow())?;
                            return Ok(Flow::Continue);
                        }
                    },
                    None => self.current.clone(),
                };
                if self.manager.delete_conversation(&key) {
                    writeln!(out, "Deleted {}", key)?;
                }
                if key == self.current {
                    self.current = self.manager.create_conversation();
                    writeln!(out, "Started conversation {}", self.current.bold())?;
                }
            }
            ReplCommand::Module(module) => {
                self.manager.set_module(&self.current, module);
                writeln!(out, "Module set to {}", module.to_string().green())?;
            }
            ReplCommand::Help => writeln!(out, "{}", HELP_TEXT)?,
            ReplCommand::Quit => return Ok(Flow::Quit),
            ReplCommand::Invalid(reason) => writeln!(out, "{}", reason.yellow())?,
        }
        Ok(Flow::Continue)
    }

    fn print_list(&self, out: &mut impl Write) -> Result<()> {
        for summary in self.manager.list_conversations() {
            let marker = if summary.key == self.current { "*" } else { " " };
            writeln!(
                out,
                "{} {}  {}  {}",
                marker,
                summary.key.chars().take(8).collect::<String>().bold(),
                format_timestamp(summary.last_timestamp_ms).dimmed(),
                summary.title
            )?;
        }
        Ok(())
    }

    /// Full key, or the single key starting with `prefix`
    fn resolve_key(&self, prefix: &str) -> std::result::Result<String, String> {
        if self.manager.contains(prefix) {
            return Ok(prefix.to_string());
        }
        let matches: Vec<String> = self
            .manager
            .list_conversations()
            .into_iter()
            .map(|s| s.key)
            .filter(|k| k.starts_with(prefix))
            .collect();
        match matches.as_slice() {
            [only] => Ok(only.clone()),
            [] => Err(format!("No conversation matches '{}'", prefix)),
            _ => Err(format!("'{}' matches {} conversations", prefix, matches.len())),
        }
    }
}

fn render_result(result: &ChatResult, out: &mut impl Write) -> Result<()> {
    if result.is_success() {
        writeln!(out, "{} {}", "ai>".green().bold(), result.reply)?;
    } else {
        writeln!(out, "{} {}", "ai>".red().bold(), result.reply)?;
        if let Some(code) = &result.error_code {
            writeln!(out, "    {}", format!("({})", code).dimmed())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ChatSettings;
    use crate::transport::{ChatReply, MockChatTransport, TransportError};
    use std::sync::Arc;

    fn repl(mock: MockChatTransport) -> ChatRepl {
        colored::control::set_override(false);
        let settings = ChatSettings {
            greeting: None,
            ..ChatSettings::default()
        };
        ChatRepl::new(ConversationSessionManager::new(Arc::new(mock), settings))
    }

    fn echo() -> MockChatTransport {
        let mut mock = MockChatTransport::new();
        mock.expect_send().returning(|req| {
            Ok(ChatReply {
                reply: format!("echo {}", req.text),
                session_id: req.session_id.clone(),
            })
        });
        mock
    }

    async fn run(repl: &mut ChatRepl, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = repl.handle(ReplCommand::parse(line), &mut out).await.unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_message_round_trip_is_rendered() {
        let mut repl = repl(echo());
        let (flow, out) = run(&mut repl, "hello").await;
        assert_eq!(flow, Flow::Continue);
        assert!(out.contains("echo hello"));

        let (_, history) = run(&mut repl, "/history").await;
        assert!(history.contains("you> hello"));
        assert!(history.contains("ai> echo hello"));
    }

    #[tokio::test]
    async fn test_failure_shows_fallback_and_code() {
        let mut mock = MockChatTransport::new();
        mock.expect_send()
            .returning(|_| Err(TransportError::Malformed("not json".to_string())));
        let mut repl = repl(mock);
        let (_, out) = run(&mut repl, "hello").await;
        assert!(out.contains("抱歉，我暂时无法连接到服务器"));
        assert!(out.contains("MALFORMED_RESPONSE"));
    }

    #[tokio::test]
    async fn test_blank_line_sends_nothing() {
        let mut mock = MockChatTransport::new();
        mock.expect_send().never();
        let mut repl = repl(mock);
        let (_, out) = run(&mut repl, "   ").await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_new_switch_and_delete() {
        let mut repl = repl(echo());
        let first = repl.current().to_string();
        run(&mut repl, "first question").await;

        run(&mut repl, "/new").await;
        let second = repl.current().to_string();
        assert_ne!(first, second);

        let (_, out) = run(&mut repl, &format!("/switch {}", &first[..8])).await;
        assert_eq!(repl.current(), first);
        assert!(out.contains("echo first question"));

        let (_, out) = run(&mut repl, "/switch zzzz").await;
        assert!(out.contains("No conversation matches"));

        let (_, list) = run(&mut repl, "/list").await;
        assert!(list.contains("first question"));

        run(&mut repl, "/delete").await;
        assert!(!repl.manager().contains(&first));
        assert_ne!(repl.current(), first);
        assert!(repl.manager().contains(&second));
    }

    #[tokio::test]
    async fn test_module_switch_changes_prompt() {
        let mut repl = repl(echo());
        assert_eq!(repl.prompt(), "[shipping-fee] > ");
        run(&mut repl, "/module assistant").await;
        assert_eq!(repl.prompt(), "[assistant] > ");
    }

    #[tokio::test]
    async fn test_quit() {
        let mut repl = repl(echo());
        assert_eq!(run(&mut repl, "/quit").await.0, Flow::Quit);
    }
}
