use crate::transport::ChatModule;

/// One line of REPL input, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text to send
    Message(String),
    New,
    List,
    /// Switch to a conversation by key (prefix); `None` opens the picker
    Switch(Option<String>),
    History,
    /// Delete a conversation by key (prefix); `None` means the current one
    Delete(Option<String>),
    Module(ChatModule),
    Help,
    Quit,
    /// Slash command that didn't parse, with the reason
    Invalid(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /new                 start a new conversation
  /list                list conversations, most recent first
  /switch [key]        switch conversation (picker when no key given)
  /history             show the current conversation
  /delete [key]        delete a conversation (current when no key given)
  /module <name>       route this conversation to shipping-fee or assistant
  /help                show this help
  /quit                exit
Anything else is sent as a message.";

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(body) = trimmed.strip_prefix('/') else {
            return Self::Message(trimmed.to_string());
        };

        let mut parts = body.split_whitespace();
        let name = parts.next().unwrap_or("").to_ascii_lowercase();
        let arg = parts.next().map(str::to_string);

        match name.as_str() {
            "new" => Self::New,
            "list" | "ls" => Self::List,
            "switch" | "sw" => Self::Switch(arg),
            "history" => Self::History,
            "delete" | "rm" => Self::Delete(arg),
            "module" => match arg {
                Some(value) => value.parse().map_or_else(Self::Invalid, Self::Module),
                None => Self::Invalid("Usage: /module <shipping-fee|assistant>".to_string()),
            },
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Invalid(format!("Unknown command '/{}'. Try /help", other)),
        }
    }
}
