use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};
use std::sync::Arc;

use super::repl::{ChatRepl, Flow};
use super::commands::ReplCommand;
use crate::{
    app::{load_config, load_config_file, Config},
    cli::{handle_command, Cli},
    session::{ChatSettings, ConversationSessionManager},
    transport::HttpTransport,
    utils::log_status,
};

/// Config from file (explicit `--config` or the layered defaults), with
/// CLI flags applied on top
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config_file(config_path)?
    } else {
        match load_config() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("Failed to load config: {}. Using defaults.", e);
                Config::default()
            }
        }
    };

    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.base_url = endpoint.clone();
    }
    if let Some(module) = cli.module {
        config.chat.default_module = module;
    }
    if let Some(user_id) = &cli.user_id {
        config.chat.user_id = user_id.clone();
    }

    Ok(config)
}

/// Build the manager wired to the HTTP transport
pub fn build_manager(config: &Config) -> Result<ConversationSessionManager> {
    let transport = HttpTransport::new(config)?;
    Ok(ConversationSessionManager::new(
        Arc::new(transport),
        ChatSettings::from(config),
    ))
}

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let config = resolve_config(&cli)?;
        Ok(Self { cli, config })
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        // Handle subcommands
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(()); // Command handled, exit
            }
            // Continue to chat for Commands::Chat
        }

        let manager = build_manager(&self.config)?;
        log_status(format!("Connected to {}", manager.endpoint().green()));
        log_status("Type /help for commands.\n");

        let mut repl = ChatRepl::new(manager);
        let mut stdout = std::io::stdout();
        repl.print_history(&mut stdout)?;

        loop {
            print!("{}", repl.prompt().bold());
            stdout.flush()?;

            let Some(line) = read_line().await? else {
                break; // EOF
            };

            let flow = repl.handle(ReplCommand::parse(&line), &mut stdout).await?;
            stdout.flush()?;
            if flow == Flow::Quit {
                break;
            }
        }

        Ok(())
    }
}

/// Read one line from stdin off the async runtime. A blocking read per
/// prompt leaves nothing reading stdin while the picker owns the terminal.
async fn read_line() -> Result<Option<String>> {
    let line = tokio::task::spawn_blocking(|| -> std::io::Result<Option<String>> {
        let mut buf = String::new();
        let read = std::io::stdin().lock().read_line(&mut buf)?;
        Ok((read > 0).then_some(buf))
    })
    .await??;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChatModule;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_cli_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[endpoint]\nbase_url = \"http://file:8000\"\n\n[chat]\nuser_id = \"from-file\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "nativeai",
            "--config",
            path.to_str().unwrap(),
            "--module",
            "assistant",
            "--user-id",
            "from-cli",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.chat.user_id, "from-cli");
        assert_eq!(config.chat.default_module, ChatModule::Assistant);
        if std::env::var("NATIVEAI_BASE_URL").is_err() {
            assert_eq!(config.endpoint.base_url, "http://file:8000");
        }
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let cli = Cli::try_parse_from(["nativeai", "--config", "/definitely/not/here.toml"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }
}
