//! HTTP model invoker for OpenAI-compatible `/chat/completions` endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use agentnx_core::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use agentnx_core::{Error, ModelReference, Result};

use crate::http::{endpoint_url, status_error, transport_error};
use crate::registry::ProviderRegistry;
use crate::traits::{CompletionParams, InvocationTarget, ModelInvoker};

// ─────────────────────────────────────────────
// HttpInvoker
// ─────────────────────────────────────────────

/// Calls whichever provider a [`ModelReference`] names, using the registry
/// for the base URL and credential.
#[derive(Debug)]
pub struct HttpInvoker {
    registry: Arc<ProviderRegistry>,
    params: CompletionParams,
}

impl HttpInvoker {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self::with_params(registry, CompletionParams::default())
    }

    pub fn with_params(registry: Arc<ProviderRegistry>, params: CompletionParams) -> Self {
        Self { registry, params }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }
}

#[async_trait]
impl ModelInvoker for HttpInvoker {
    fn resolve(&self, reference: &ModelReference) -> Result<InvocationTarget> {
        Ok(InvocationTarget {
            reference: reference.clone(),
            endpoint: self.registry.resolve(reference)?,
        })
    }

    async fn invoke_target(&self, target: &InvocationTarget, prompt: &str) -> Result<String> {
        let reference = &target.reference;
        let url = endpoint_url(&target.endpoint.base_url, "chat/completions");

        debug!(
            provider = %reference.provider,
            model = %reference.model_id,
            prompt_len = prompt.len(),
            "Calling model"
        );

        let request_body = ChatCompletionRequest {
            model: reference.model_id.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        };

        let response = self
            .registry
            .client()
            .post(&url)
            .bearer_auth(&target.endpoint.credential)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %reference.provider, error = %e, "HTTP request failed");
                transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let err = status_error(response).await;
            error!(provider = %reference.provider, status = %status, error = %err, "API error");
            return Err(err);
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(provider = %reference.provider, error = %e, "Failed to parse model response");
            Error::upstream(format!("malformed completion response: {e}"))
        })?;

        let content = completion
            .into_first_content()
            .ok_or_else(|| Error::upstream("completion response has no message content"))?;

        debug!(
            provider = %reference.provider,
            model = %reference.model_id,
            reply_len = content.len(),
            "Model response received"
        );

        Ok(content)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
