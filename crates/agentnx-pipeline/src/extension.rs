//! Extension facade — what a host calls once per conversational turn.
//!
//! Holds the current settings as an immutable `Arc<Config>` snapshot. Every
//! settings command builds a new snapshot and swaps it in, so a message being
//! processed keeps the settings it started with.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{error, info, warn};

use agentnx_core::config::Config;
use agentnx_core::{Error, ModelDescriptor, ModelReference, Result};
use agentnx_providers::{build_client, HttpInvoker, ModelInvoker, ProviderRegistry};

use crate::pipeline::DualStagePipeline;

/// Reply used when the pipeline fails for lack of configuration.
pub const NOT_CONFIGURED_REPLY: &str =
    "Models are not configured. Set model A and model B in the settings.";

/// Reply used for every other failure.
pub const FAILURE_REPLY: &str = "An error occurred while processing the message.";

// ─────────────────────────────────────────────
// Extension
// ─────────────────────────────────────────────

pub struct Extension {
    registry: Arc<ProviderRegistry>,
    pipeline: DualStagePipeline,
    settings: RwLock<Arc<Config>>,
}

impl Extension {
    /// Build the extension with an HTTP invoker.
    ///
    /// The client timeout comes from `config.http` and is fixed for the
    /// lifetime of the extension; `timeoutSecs: 0` means no timeout.
    pub fn new(config: Config) -> Result<Self> {
        let client = build_client(Duration::from_secs(config.http.timeout_secs))?;
        let registry = Arc::new(ProviderRegistry::new(client));
        let invoker = Arc::new(HttpInvoker::new(registry.clone()));
        Ok(Self::with_invoker(config, registry, invoker))
    }

    /// Build the extension around any invoker sharing `registry`.
    pub fn with_invoker(
        config: Config,
        registry: Arc<ProviderRegistry>,
        invoker: Arc<dyn ModelInvoker>,
    ) -> Self {
        registry.replace_all(&config.providers);
        info!(
            providers = config.providers.len(),
            ready = config.pipeline.is_ready(),
            "extension initialized"
        );
        Self {
            registry,
            pipeline: DualStagePipeline::new(invoker),
            settings: RwLock::new(Arc::new(config)),
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// The settings snapshot in effect right now.
    pub fn settings(&self) -> Arc<Config> {
        self.settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Clone the current snapshot, edit the clone, swap it in.
    ///
    /// The write lock is held for the whole sequence so concurrent commands
    /// apply one after another. Lock order: settings, then registry.
    fn update(&self, edit: impl FnOnce(&mut Config)) -> Arc<Config> {
        let mut current = self.settings.write().unwrap_or_else(|e| e.into_inner());
        let mut next = Config::clone(&current);
        edit(&mut next);
        let snapshot = Arc::new(next);
        *current = snapshot.clone();
        snapshot
    }

    /// Copy the registry's records into a new snapshot.
    ///
    /// The registry is read under the settings lock, so the last sync to run
    /// sees every registry edit made before it.
    fn sync_providers(&self) -> Arc<Config> {
        self.update(|cfg| cfg.providers = self.registry.to_providers())
    }

    // ────────────── Messages ──────────────

    /// Run the pipeline, propagating the typed error.
    ///
    /// When `deadlineSecs` is set it bounds both stages together.
    pub async fn process(&self, message: &str) -> Result<String> {
        let settings = self.settings();
        let run = self.pipeline.process(&settings.pipeline, message);

        match settings.deadline_secs {
            Some(secs) => {
                let deadline = Duration::from_secs(secs);
                tokio::time::timeout(deadline, run)
                    .await
                    .map_err(|_| Error::DeadlineExceeded(deadline))?
            }
            None => run.await,
        }
    }

    /// Run the pipeline and always return something to show the user.
    pub async fn on_message(&self, message: &str) -> String {
        match self.process(message).await {
            Ok(reply) => reply,
            Err(e) if e.is_configuration() => {
                error!(error = %e, "pipeline not configured");
                NOT_CONFIGURED_REPLY.to_string()
            }
            Err(e) => {
                error!(error = %e, "pipeline failed");
                FAILURE_REPLY.to_string()
            }
        }
    }

    // ────────────── Settings commands ──────────────

    /// Replace the settings wholesale.
    pub fn load_settings(&self, config: Config) {
        let mut current = self.settings.write().unwrap_or_else(|e| e.into_inner());
        self.registry.replace_all(&config.providers);
        *current = Arc::new(config);
        info!("settings reloaded");
    }

    /// Register an empty provider. Returns `false` if the name is taken.
    pub fn add_provider(&self, name: &str) -> bool {
        let added = self.registry.add_provider(name);
        if added {
            self.sync_providers();
        }
        added
    }

    /// Delete a provider; model references to it stay set but stop resolving.
    pub fn remove_provider(&self, name: &str) -> bool {
        let removed = self.registry.remove_provider(name);
        if removed {
            let snapshot = self.sync_providers();
            let dangling = [&snapshot.pipeline.model_a, &snapshot.pipeline.model_b]
                .into_iter()
                .flatten()
                .any(|r| r.provider == name);
            if dangling {
                warn!(provider = name, "removed provider is still selected for a stage");
            }
        }
        removed
    }

    /// Set a provider's base URL and credential.
    pub fn save_provider(&self, name: &str, url: &str, api_key: &str) {
        self.registry.save_provider(name, url, api_key);
        self.sync_providers();
    }

    /// Fetch the provider's model list and store it in the settings.
    pub async fn fetch_models(&self, name: &str) -> Result<Vec<ModelDescriptor>> {
        let models = self.registry.list_models(name).await?;
        self.sync_providers();
        Ok(models)
    }

    pub fn set_model_a(&self, model: Option<ModelReference>) {
        self.update(|cfg| cfg.pipeline.model_a = model);
    }

    pub fn set_model_b(&self, model: Option<ModelReference>) {
        self.update(|cfg| cfg.pipeline.model_b = model);
    }

    pub fn set_prompt_a(&self, template: impl Into<String>) {
        let template = template.into();
        self.update(|cfg| cfg.pipeline.prompt_a = template);
    }

    pub fn set_prompt_b(&self, template: impl Into<String>) {
        let template = template.into();
        self.update(|cfg| cfg.pipeline.prompt_b = template);
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
