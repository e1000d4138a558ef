//! Prompt construction for both pipeline stages.
//!
//! Layout: `{template}\n\n{body}\n\nStyle requirements: {styles}` where
//! `{styles}` is the sorted-key JSON of the parsed directives.

use agentnx_core::config::PipelineConfig;
use agentnx_core::StyleMap;

/// Label in front of the serialized style directives.
pub const STYLE_LABEL: &str = "Style requirements";

/// Combine a template, a body and the style directives into one prompt.
pub fn build_stage_prompt(template: &str, body: &str, styles: &StyleMap) -> String {
    format!(
        "{template}\n\n{body}\n\n{STYLE_LABEL}: {}",
        styles.to_prompt_json()
    )
}

/// Stage A prompt: the raw message, tags included.
pub fn outline_prompt(config: &PipelineConfig, message: &str, styles: &StyleMap) -> String {
    build_stage_prompt(&config.prompt_a, message, styles)
}

/// Stage B prompt: the full outline produced by stage A.
pub fn reply_prompt(config: &PipelineConfig, outline: &str, styles: &StyleMap) -> String {
    build_stage_prompt(&config.prompt_b, outline, styles)
}
