//! `agentnx onboard` — create the default configuration.
//!
//! - Writes `config.json` with empty providers and the default prompts
//! - Creates the REPL history directory

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use agentnx_core::config::{save_config, Config};
use agentnx_core::utils::get_history_path;

/// Run the onboard command.
pub fn run(config_path: &Path) -> Result<()> {
    println!();
    println!("{}", "AgentNx — Setup".cyan().bold());
    println!();

    if ensure_config(config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = get_history_path();
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;
    println!("  {} history dir at {}", "✓".green(), history_dir.display());

    println!();
    println!("{}", "  Next steps:".green());
    println!("    agentnx provider save <name> --url <base-url> --api-key <key>");
    println!("    agentnx provider fetch-models <name>");
    println!("    agentnx model set-a <provider>/<model>");
    println!("    agentnx model set-b <provider>/<model>");
    println!("    agentnx chat");
    println!();

    Ok(())
}

/// Write a default config unless one exists. Returns `true` if created.
fn ensure_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write config: {}", path.display()))?;
    Ok(true)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
