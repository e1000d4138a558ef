//! Model invoker trait — the seam between the pipeline and the network.

use async_trait::async_trait;

use agentnx_core::{ModelReference, Result};

use crate::registry::ResolvedEndpoint;

/// Sampling parameters sent with every completion request.
#[derive(Clone, Debug)]
pub struct CompletionParams {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

/// A model reference pinned to the endpoint it resolved to.
///
/// Later registry edits do not affect a target that has already been
/// resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationTarget {
    pub reference: ModelReference,
    pub endpoint: ResolvedEndpoint,
}

/// Runs one prompt against one model and returns the reply text.
///
/// Implementations make a single attempt; retrying is the caller's call.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Pin `reference` to its current endpoint, without any network call.
    ///
    /// # Errors
    /// `Error::Configuration` when the provider is absent or incomplete.
    fn resolve(&self, reference: &ModelReference) -> Result<InvocationTarget>;

    /// Send `prompt` as a single user message to an already resolved target.
    ///
    /// # Errors
    /// `Error::Upstream` on transport failure, non-success status, or a
    /// response without first-choice content.
    async fn invoke_target(&self, target: &InvocationTarget, prompt: &str) -> Result<String>;

    /// Resolve `reference` now and invoke it.
    async fn invoke(&self, reference: &ModelReference, prompt: &str) -> Result<String> {
        let target = self.resolve(reference)?;
        self.invoke_target(&target, prompt).await
    }
}
