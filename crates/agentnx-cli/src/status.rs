//! `agentnx status` — show configuration and provider status.
//!
//! - Config path, stage models and prompt templates
//! - Per-provider URL, masked key and model count

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use agentnx_core::config::{load_config, ProviderEntry};
use agentnx_core::utils::{mask_secret, truncate_string};
use agentnx_core::ModelReference;

/// Run the status command.
pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(Some(config_path));

    println!();
    println!("{}", "AgentNx Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    // Stages
    println!("  {:<18} {}", "Model A:".bold(), model_label(config.pipeline.model_a.as_ref()));
    println!("  {:<18} {}", "Model B:".bold(), model_label(config.pipeline.model_b.as_ref()));
    println!(
        "  {:<18} {}",
        "Prompt A:".bold(),
        truncate_string(&config.pipeline.prompt_a, 60).dimmed()
    );
    println!(
        "  {:<18} {}",
        "Prompt B:".bold(),
        truncate_string(&config.pipeline.prompt_b, 60).dimmed()
    );
    println!(
        "  {:<18} {}",
        "HTTP:".bold(),
        format!(
            "timeout: {}s | deadline: {}",
            config.http.timeout_secs,
            config
                .deadline_secs
                .map(|s| format!("{s}s"))
                .unwrap_or_else(|| "none".to_string())
        )
        .dimmed()
    );

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    if config.providers.is_empty() {
        println!("    {}", "· none".dimmed());
    }
    for (name, entry) in &config.providers {
        println!("    {:<20} {}", name, provider_label(entry));
    }

    // Stage references that point nowhere
    for (stage, reference) in [
        ("A", config.pipeline.model_a.as_ref()),
        ("B", config.pipeline.model_b.as_ref()),
    ] {
        if let Some(r) = reference {
            let usable = config
                .providers
                .get(&r.provider)
                .is_some_and(ProviderEntry::is_configured);
            if !usable {
                println!();
                println!(
                    "  {} model {} uses provider '{}', which is not configured",
                    "!".yellow().bold(),
                    stage,
                    r.provider
                );
            }
        }
    }

    println!();

    Ok(())
}

fn model_label(reference: Option<&ModelReference>) -> String {
    match reference {
        Some(r) => r.to_string(),
        None => "(not set)".red().to_string(),
    }
}

fn provider_label(entry: &ProviderEntry) -> String {
    if !entry.is_configured() {
        return format!("{}", "· not configured".dimmed());
    }
    let fetched = entry
        .models_fetched_at
        .map(|t| format!(", fetched {}", t.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    format!(
        "{} {} (key {}) {}",
        "✓".green(),
        entry.url,
        mask_secret(&entry.api_key),
        format!("{} models{}", entry.models.len(), fetched).dimmed()
    )
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
