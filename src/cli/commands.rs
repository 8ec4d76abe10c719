use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{init_config, Config},
    transport::{ChatModule, HttpTransport},
};

use super::Commands;

/// Handle CLI subcommands. Returns true when the command was handled and
/// the process should exit instead of starting a chat.
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing NativeAI configuration...");
            let path = init_config()?;
            println!("Configuration available at: {}", path.display());
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// Show version information
pub fn show_version() {
    println!("nativeai v{}", env!("CARGO_PKG_VERSION"));
    println!("   Terminal chat client for the NativeAI agent service");
}

/// Show service reachability and effective settings
async fn show_status(config: &Config) -> Result<()> {
    let transport = HttpTransport::new(config)?;

    println!("NativeAI Status:");
    println!();

    match transport.check_health().await {
        Ok(report) if report.is_healthy() => {
            println!(
                "  [OK] Service: {} (v{}, redis {})",
                transport.url_for(""),
                report.version,
                if report.redis_connected { "connected" } else { "disconnected" }
            );
        }
        Ok(report) => {
            println!(
                "  [WARNING] Service: {} reports status '{}'",
                transport.url_for(""),
                report.status
            );
        }
        Err(e) => {
            println!("  [ERROR] Service: {} unreachable ({})", transport.url_for(""), e);
        }
    }

    println!("\n  Modules:");
    for module in ChatModule::ALL {
        let marker = if module == config.chat.default_module { "*" } else { " " };
        println!("   {} {} -> {}", marker, module.to_string().green(), transport.endpoint_url(module));
    }

    println!("\n  Environment:");
    if std::env::var(&config.endpoint.api_key_env).is_ok() {
        println!("    • {}: Set", config.endpoint.api_key_env);
    } else if config.endpoint.api_key.is_some() {
        println!("    • Bearer credential: from config");
    } else {
        println!("    • No bearer credential configured");
    }
    println!("    • User id: {}", config.chat.user_id);

    println!();
    Ok(())
}
