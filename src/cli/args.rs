use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::transport::ChatModule;

#[derive(Parser, Debug)]
#[command(name = "nativeai")]
#[command(version)]
#[command(about = "Terminal chat client for the NativeAI agent service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Service base URL (overrides config)
    #[arg(short, long, env = "NATIVEAI_BASE_URL")]
    pub endpoint: Option<String>,

    /// Module to start conversations in (shipping-fee, assistant)
    #[arg(short, long)]
    pub module: Option<ChatModule>,

    /// User id sent with every request
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Non-interactive prompt to execute
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
    /// Check that the service is reachable
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}
