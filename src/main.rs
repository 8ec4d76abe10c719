use anyhow::Result;
use clap::Parser;

use nativeai_chat::{
    cli::Cli,
    runtime::{build_manager, resolve_config, NonInteractiveRunner, Orchestrator},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    // Check if running in non-interactive mode
    if let Some(prompt) = cli.prompt.clone() {
        run_non_interactive(cli, prompt).await
    } else {
        // Create and run the orchestrator for interactive mode
        let orchestrator = Orchestrator::new(cli)?;
        orchestrator.run().await
    }
}

/// Run in non-interactive mode
async fn run_non_interactive(cli: Cli, prompt: String) -> Result<()> {
    let config = resolve_config(&cli)?;
    let runner = NonInteractiveRunner::new(build_manager(&config)?);

    // Execute the prompt
    let result = runner.execute(prompt).await?;

    // Format and output the result
    println!("{}", runner.format_result(&result, cli.output_format));

    // Exit with appropriate code
    if !result.result.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
