//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use agentnx_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Stage A template: {}", cfg.pipeline.prompt_a);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{apply_env_overrides, get_config_path, load_config, load_config_strict, save_config};
pub use schema::{Config, HttpConfig, PipelineConfig, ProviderEntry};
