//! Shared CLI helpers — path expansion, settings persistence, output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use agentnx_core::config::{load_config, load_config_strict, save_config};
use agentnx_pipeline::Extension;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Load the settings at `config_path` plus env overrides into a fresh
/// extension. Falls back to defaults on a bad file; never write this back.
pub fn open_extension(config_path: &Path) -> Result<Extension> {
    let config = load_config(Some(config_path));
    Extension::new(config).context("failed to initialize the pipeline")
}

/// Load the settings exactly as stored, for commands that [`persist`] them.
///
/// Env overrides are left out so they never reach the file, and an
/// unparseable file is an error instead of being replaced with defaults.
pub fn open_stored_extension(config_path: &Path) -> Result<Extension> {
    let config = load_config_strict(config_path)
        .with_context(|| format!("refusing to edit {}", config_path.display()))?;
    Extension::new(config).context("failed to initialize the pipeline")
}

/// Write the extension's current settings snapshot back to disk.
pub fn persist(extension: &Extension, config_path: &Path) -> Result<()> {
    save_config(&extension.settings(), Some(config_path))
        .with_context(|| format!("failed to write config: {}", config_path.display()))
}

/// Print a pipeline reply to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "AgentNx".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "AgentNx".cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Type a message (add [style=...] to steer the reply), or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder while both stages run.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Green check line used by the settings commands.
pub fn print_done(message: &str) {
    println!("  {} {}", "✓".green(), message);
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
