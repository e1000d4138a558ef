//! `agentnx model` and `agentnx prompt` — stage models and templates.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use agentnx_core::config::schema::{DEFAULT_PROMPT_A, DEFAULT_PROMPT_B};
use agentnx_core::ModelReference;
use agentnx_pipeline::Extension;

use crate::helpers::{open_stored_extension, persist, print_done};

/// Model subcommands.
#[derive(Subcommand)]
pub enum ModelCommands {
    /// Set the stage A (outline) model, as `provider/modelId`
    SetA { model: String },

    /// Set the stage B (reply) model, as `provider/modelId`
    SetB { model: String },

    /// Unset both stage models
    Clear,
}

/// Prompt subcommands.
#[derive(Subcommand)]
pub enum PromptCommands {
    /// Set the stage A template
    SetA { template: String },

    /// Set the stage B template
    SetB { template: String },

    /// Restore both default templates
    Reset,
}

#[derive(Clone, Copy)]
enum Stage {
    A,
    B,
}

pub fn dispatch_model(cmd: ModelCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ModelCommands::SetA { model } => set_model(config_path, Stage::A, &model),
        ModelCommands::SetB { model } => set_model(config_path, Stage::B, &model),
        ModelCommands::Clear => {
            let extension = open_stored_extension(config_path)?;
            extension.set_model_a(None);
            extension.set_model_b(None);
            persist(&extension, config_path)?;
            print_done("cleared model A and model B");
            Ok(())
        }
    }
}

pub fn dispatch_prompt(cmd: PromptCommands, config_path: &Path) -> Result<()> {
    let extension = open_stored_extension(config_path)?;
    match cmd {
        PromptCommands::SetA { template } => {
            extension.set_prompt_a(template);
            print_done("updated prompt A");
        }
        PromptCommands::SetB { template } => {
            extension.set_prompt_b(template);
            print_done("updated prompt B");
        }
        PromptCommands::Reset => {
            extension.set_prompt_a(DEFAULT_PROMPT_A);
            extension.set_prompt_b(DEFAULT_PROMPT_B);
            print_done("restored default prompts");
        }
    }
    persist(&extension, config_path)
}

fn set_model(config_path: &Path, stage: Stage, raw: &str) -> Result<()> {
    let reference: ModelReference = raw
        .parse()
        .with_context(|| format!("invalid model '{raw}', expected provider/modelId"))?;

    let extension = open_stored_extension(config_path)?;
    if let Some(note) = availability_note(&extension, &reference) {
        println!("  {} {}", "!".yellow().bold(), note);
    }

    let label = match stage {
        Stage::A => {
            extension.set_model_a(Some(reference.clone()));
            "A"
        }
        Stage::B => {
            extension.set_model_b(Some(reference.clone()));
            "B"
        }
    };
    persist(&extension, config_path)?;
    print_done(&format!("model {label} set to {reference}"));
    Ok(())
}

/// Explain why `reference` may not resolve yet. Saving goes ahead either way.
fn availability_note(extension: &Extension, reference: &ModelReference) -> Option<String> {
    let settings = extension.settings();
    let Some(entry) = settings.providers.get(&reference.provider) else {
        return Some(format!("provider '{}' is not registered", reference.provider));
    };
    if !entry.is_configured() {
        return Some(format!(
            "provider '{}' has no URL or API key yet",
            reference.provider
        ));
    }
    if !entry.models.is_empty() && !entry.models.iter().any(|m| m.id == reference.model_id) {
        return Some(format!(
            "'{}' is not in the fetched model list for '{}'",
            reference.model_id, reference.provider
        ));
    }
    None
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
