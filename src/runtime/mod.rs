/// Runtime orchestrator module - Gateway

mod commands;
mod non_interactive;
mod orchestrator;
mod repl;

pub use commands::{ReplCommand, HELP_TEXT};
pub use non_interactive::{ExecutionMetadata, NonInteractiveResult, NonInteractiveRunner};
pub use orchestrator::{build_manager, resolve_config, Orchestrator};
pub use repl::{ChatRepl, Flow};
