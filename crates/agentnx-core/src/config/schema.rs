//! Configuration schema — the settings object shared by the facade and the CLI.
//!
//! JSON on disk uses **camelCase** keys (`providers`, `modelA`, `promptA`, …);
//! Rust uses snake_case via `#[serde(rename_all = "camelCase")]`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ModelDescriptor, ModelReference};

/// Stage A template used when none is configured.
pub const DEFAULT_PROMPT_A: &str =
    "Analyze the following conversation and produce an outline for the reply.";

/// Stage B template used when none is configured.
pub const DEFAULT_PROMPT_B: &str = "Write the final reply following the outline below.";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.agentnx/config.json` + env vars.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Provider name → endpoint, credential and known models.
    pub providers: BTreeMap<String, ProviderEntry>,
    /// `modelA`, `modelB`, `promptA`, `promptB` live at the top level.
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
    pub http: HttpConfig,
    /// Deadline for the whole two-stage chain, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Settings for one provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderEntry {
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    pub url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Last fetched model list.
    pub models: Vec<ModelDescriptor>,
    /// When `models` was last fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models_fetched_at: Option<DateTime<Utc>>,
}

impl ProviderEntry {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Both the URL and the key are set.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

// ─────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────

/// Which models run each stage and the templates that open each prompt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Stage A: analysis/outline model.
    pub model_a: Option<ModelReference>,
    /// Stage B: final reply model.
    pub model_b: Option<ModelReference>,
    pub prompt_a: String,
    pub prompt_b: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_a: None,
            model_b: None,
            prompt_a: DEFAULT_PROMPT_A.to_string(),
            prompt_b: DEFAULT_PROMPT_B.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn is_ready(&self) -> bool {
        self.model_a.is_some() && self.model_b.is_some()
    }
}

// ─────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────

/// Outbound HTTP client settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
