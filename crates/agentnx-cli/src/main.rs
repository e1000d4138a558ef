//! AgentNx CLI — entry point.
//!
//! # Commands
//!
//! - `agentnx chat [-m MESSAGE]` — run the pipeline (single-shot or REPL)
//! - `agentnx onboard` — create the default config
//! - `agentnx status` — show providers, models and prompts
//! - `agentnx provider|model|prompt …` — edit the settings

mod helpers;
mod onboard;
mod provider_cmd;
mod repl;
mod settings_cmd;
mod status;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use agentnx_core::config::get_config_path;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// AgentNx — two models, one reply
#[derive(Parser)]
#[command(name = "agentnx", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.agentnx/config.json
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message through model A and model B (single-shot or REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Create the default configuration
    Onboard,

    /// Show configuration and provider status
    Status,

    /// Manage providers
    Provider {
        #[command(subcommand)]
        action: provider_cmd::ProviderCommands,
    },

    /// Choose the models for each stage
    Model {
        #[command(subcommand)]
        action: settings_cmd::ModelCommands,
    },

    /// Edit the stage prompt templates
    Prompt {
        #[command(subcommand)]
        action: settings_cmd::PromptCommands,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .as_deref()
        .map(helpers::expand_tilde)
        .unwrap_or_else(get_config_path);

    match cli.command {
        Commands::Chat { message, logs } => {
            init_logging(logs);
            run_chat(&config_path, message).await
        }
        Commands::Onboard => onboard::run(&config_path),
        Commands::Status => status::run(&config_path),
        Commands::Provider { action } => {
            init_logging(false);
            provider_cmd::dispatch(action, &config_path).await
        }
        Commands::Model { action } => {
            init_logging(false);
            settings_cmd::dispatch_model(action, &config_path)
        }
        Commands::Prompt { action } => {
            init_logging(false);
            settings_cmd::dispatch_prompt(action, &config_path)
        }
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(config_path: &Path, message: Option<String>) -> Result<()> {
    let extension = helpers::open_extension(config_path)?;

    match message {
        Some(msg) => {
            // Single-shot: errors surface as a non-zero exit
            info!("processing single message");
            let reply = extension
                .process(&msg)
                .await
                .context("pipeline processing failed")?;
            helpers::print_response(&reply);
        }
        None => {
            repl::run(&extension).await?;
        }
    }

    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("agentnx=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
