//! Core types for AgentNx — model references, descriptors, and the
//! OpenAI-compatible wire format spoken to every provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─────────────────────────────────────────────
// Model references & descriptors
// ─────────────────────────────────────────────

/// Points at one model of one provider. Not an owning link: the provider
/// may be removed later, after which resolution fails.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelReference {
    /// Provider name as registered (e.g. `"openai"`).
    pub provider: String,
    /// Model identifier sent in the request body (e.g. `"gpt-4o"`).
    pub model_id: String,
}

impl ModelReference {
    pub fn new(provider: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_id: model_id.into(),
        }
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model_id)
    }
}

/// Compact CLI form `provider/modelId`, split on the first `/` so model ids
/// like `meta-llama/llama-3` survive.
impl FromStr for ModelReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((provider, model_id))
                if !provider.trim().is_empty() && !model_id.trim().is_empty() =>
            {
                Ok(ModelReference::new(provider.trim(), model_id.trim()))
            }
            _ => Err(Error::configuration(format!(
                "invalid model reference '{s}', expected 'provider/modelId'"
            ))),
        }
    }
}

/// A model offered by a provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    /// Human-readable name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

// ─────────────────────────────────────────────
// Chat completion wire format
// ─────────────────────────────────────────────

/// One message in a chat completion request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for `POST {base}/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Raw chat completion response; only the fields we read are modelled.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if the provider sent one.
    pub fn into_first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
    }
}

// ─────────────────────────────────────────────
// Model listing wire format
// ─────────────────────────────────────────────

/// Response body of `GET {base}/models`.
#[derive(Debug, Deserialize)]
pub struct ModelListResponse {
    pub data: Vec<ModelListEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ModelListEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<ModelListEntry> for ModelDescriptor {
    fn from(entry: ModelListEntry) -> Self {
        ModelDescriptor {
            id: entry.id,
            name: entry.name,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
