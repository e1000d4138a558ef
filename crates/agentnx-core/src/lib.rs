//! AgentNx core — shared types, inline style tags, configuration and errors.
//!
//! - [`style`] — `[style=...]` tag parser producing a [`style::StyleMap`]
//! - [`types`] — model references/descriptors and the chat completion wire format
//! - [`config`] — settings schema, JSON loader, env overrides
//! - [`error`] — configuration vs upstream error taxonomy

pub mod config;
pub mod error;
pub mod style;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use style::StyleMap;
pub use types::{ModelDescriptor, ModelReference};
