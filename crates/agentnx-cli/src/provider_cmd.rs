//! `agentnx provider` — manage provider endpoints and model lists.
//!
//! - `agentnx provider list`
//! - `agentnx provider add <name>`
//! - `agentnx provider remove <name>`
//! - `agentnx provider save <name> --url <url> --api-key <key>`
//! - `agentnx provider fetch-models <name>`

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;

use agentnx_core::config::{apply_env_overrides, load_config_strict, save_config};
use agentnx_core::ModelDescriptor;
use agentnx_pipeline::Extension;

use crate::helpers::{open_extension, open_stored_extension, persist, print_done};

// ─────────────────────────────────────────────
// Subcommand enum
// ─────────────────────────────────────────────

#[derive(Subcommand)]
pub enum ProviderCommands {
    /// List providers and their known models
    List,

    /// Register a provider with no endpoint or key yet
    Add {
        name: String,
    },

    /// Delete a provider and its model list
    Remove {
        name: String,
    },

    /// Set a provider's base URL and API key
    Save {
        name: String,

        /// Base URL, e.g. https://api.openai.com/v1
        #[arg(long)]
        url: String,

        /// Bearer credential
        #[arg(long)]
        api_key: String,
    },

    /// Fetch the provider's model list from `{url}/models`
    FetchModels {
        name: String,
    },
}

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

pub async fn dispatch(cmd: ProviderCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ProviderCommands::List => list(config_path),
        ProviderCommands::Add { name } => {
            add(config_path, &name)?;
            print_done(&format!("added provider '{name}'"));
            Ok(())
        }
        ProviderCommands::Remove { name } => {
            remove(config_path, &name)?;
            print_done(&format!("removed provider '{name}'"));
            Ok(())
        }
        ProviderCommands::Save { name, url, api_key } => {
            save(config_path, &name, &url, &api_key)?;
            print_done(&format!("saved provider '{name}'"));
            Ok(())
        }
        ProviderCommands::FetchModels { name } => {
            let models = fetch_models(config_path, &name).await?;
            print_done(&format!("{} models from '{name}'", models.len()));
            for model in &models {
                println!("    {}", model_line(model));
            }
            Ok(())
        }
    }
}

// ─────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────

fn list(config_path: &Path) -> Result<()> {
    let extension = open_extension(config_path)?;
    let settings = extension.settings();

    println!();
    if settings.providers.is_empty() {
        println!("  {}", "No providers. Add one with `agentnx provider add <name>`.".dimmed());
    }
    for (name, entry) in &settings.providers {
        let url = if entry.url.is_empty() {
            "(no url)".dimmed().to_string()
        } else {
            entry.url.clone()
        };
        println!("  {} {}", name.bold(), url);
        for model in &entry.models {
            println!("    {}", model_line(model));
        }
    }
    println!();
    Ok(())
}

fn add(config_path: &Path, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("provider name must not be empty");
    }
    let extension = open_stored_extension(config_path)?;
    if !extension.add_provider(name) {
        bail!("provider '{name}' already exists");
    }
    persist(&extension, config_path)
}

fn remove(config_path: &Path, name: &str) -> Result<()> {
    let extension = open_stored_extension(config_path)?;
    if !extension.remove_provider(name) {
        bail!("provider '{name}' does not exist");
    }
    persist(&extension, config_path)
}

fn save(config_path: &Path, name: &str, url: &str, api_key: &str) -> Result<()> {
    let extension = open_stored_extension(config_path)?;
    extension.save_provider(name, url.trim(), api_key.trim());
    persist(&extension, config_path)
}

/// Fetch with env overrides applied (the credential may live only in the
/// environment), then write just the model list into the stored file.
async fn fetch_models(config_path: &Path, name: &str) -> Result<Vec<ModelDescriptor>> {
    let mut stored = load_config_strict(config_path)
        .with_context(|| format!("refusing to edit {}", config_path.display()))?;

    let extension = Extension::new(apply_env_overrides(stored.clone()))
        .context("failed to initialize the pipeline")?;
    let models = extension
        .fetch_models(name)
        .await
        .with_context(|| format!("failed to fetch models for '{name}'"))?;

    let fetched_at = extension
        .settings()
        .providers
        .get(name)
        .and_then(|entry| entry.models_fetched_at);
    let entry = stored.providers.entry(name.to_string()).or_default();
    entry.models = models.clone();
    entry.models_fetched_at = fetched_at;

    save_config(&stored, Some(config_path))
        .with_context(|| format!("failed to write config: {}", config_path.display()))?;
    Ok(models)
}

fn model_line(model: &ModelDescriptor) -> String {
    match &model.name {
        Some(name) if name != &model.id => format!("{} {}", model.id, format!("({name})").dimmed()),
        _ => model.id.clone(),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agentnx_core::config::ProviderEntry;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn add_save_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        add(&path, "openai").unwrap();
        assert!(add(&path, "openai").is_err());
        assert!(add(&path, "  ").is_err());

        save(&path, "openai", " https://api.openai.com/v1 ", "sk-test").unwrap();
        let config = load_config_strict(&path).unwrap();
        let entry = &config.providers["openai"];
        assert_eq!(entry.url, "https://api.openai.com/v1");
        assert_eq!(entry.api_key, "sk-test");

        remove(&path, "openai").unwrap();
        assert!(load_config_strict(&path).unwrap().providers.is_empty());
        assert!(remove(&path, "openai").is_err());
    }

    #[tokio::test]
    async fn fetch_models_persists_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("Authorization", "Bearer sk-local"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "id": "llama3", "name": "Llama 3" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        save(&path, "local", &server.uri(), "sk-local").unwrap();

        let models = fetch_models(&path, "local").await.unwrap();
        assert_eq!(models[0].id, "llama3");

        let config = load_config_strict(&path).unwrap();
        assert_eq!(config.providers["local"].models, models);
    }

    #[tokio::test]
    async fn fetch_models_failure_leaves_file_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        save(&path, "local", &server.uri(), "bad").unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        assert!(fetch_models(&path, "local").await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn model_line_shows_name() {
        colored::control::set_override(false);
        assert_eq!(model_line(&ModelDescriptor::new("m1")), "m1");
        assert_eq!(
            model_line(&ModelDescriptor::with_name("m1", "Model One")),
            "m1 (Model One)"
        );
    }

    #[test]
    fn env_credentials_never_reach_the_file() {
        std::env::set_var("AGENTNX_PROVIDERS__ENVSAVECHECK__API_KEY", "sk-from-env");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        save(&path, "openai", "https://api.openai.com/v1", "sk-file").unwrap();
        add(&path, "local").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("sk-from-env"));
        assert!(!content.contains("envsavecheck"));

        std::env::remove_var("AGENTNX_PROVIDERS__ENVSAVECHECK__API_KEY");
    }

    #[tokio::test]
    async fn fetch_models_uses_env_credential_but_stores_only_models() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("Authorization", "Bearer sk-env-fetch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "id": "m-env" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        std::env::set_var("AGENTNX_PROVIDERS__ENVFETCH__API_KEY", "sk-env-fetch");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = agentnx_core::config::Config::default();
        config
            .providers
            .insert("envfetch".into(), ProviderEntry::new(server.uri(), ""));
        save_config(&config, Some(&path)).unwrap();

        let models = fetch_models(&path, "envfetch").await.unwrap();
        assert_eq!(models[0].id, "m-env");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("sk-env-fetch"));
        let stored = load_config_strict(&path).unwrap();
        assert_eq!(stored.providers["envfetch"].models, models);
        assert!(stored.providers["envfetch"].api_key.is_empty());
        assert!(stored.providers["envfetch"].models_fetched_at.is_some());

        std::env::remove_var("AGENTNX_PROVIDERS__ENVFETCH__API_KEY");
    }
}
