//! AgentNx pipeline — two models, one reply.
//!
//! This crate contains:
//! - **prompt**: stage A / stage B prompt construction
//! - **pipeline**: the strictly sequential dual-stage run
//! - **extension**: the host-facing facade with settings snapshots and
//!   fallback replies

pub mod extension;
pub mod pipeline;
pub mod prompt;

pub use extension::{Extension, FAILURE_REPLY, NOT_CONFIGURED_REPLY};
pub use pipeline::DualStagePipeline;
