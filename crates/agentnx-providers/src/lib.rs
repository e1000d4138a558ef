//! Provider layer for AgentNx.
//!
//! # Architecture
//!
//! - [`registry::ProviderRegistry`] — named providers (base URL, credential,
//!   model list), endpoint resolution and `GET /models` fetching
//! - [`traits::ModelInvoker`] — one prompt in, one reply out
//! - [`invoker::HttpInvoker`] — `ModelInvoker` over OpenAI-compatible
//!   `/chat/completions`
//! - [`http`] — client construction and upstream error mapping

pub mod http;
pub mod invoker;
pub mod registry;
pub mod traits;

pub use http::build_client;
pub use invoker::HttpInvoker;
pub use registry::{ProviderRecord, ProviderRegistry, ResolvedEndpoint};
pub use traits::{CompletionParams, InvocationTarget, ModelInvoker};
