//! Inline style tags — `[style=formal,tone:warm]` directives embedded in a message.
//!
//! Tags stay in the text; the parser only extracts the directives so both
//! pipeline stages can be told about them.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Value recorded for a bare directive such as `humorous`.
///
/// Kept as text: it ends up inside a prompt, not in a typed field.
pub const FLAG_VALUE: &str = "true";

fn style_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[style=([^\]]+)\]").expect("style tag pattern is valid"))
}

// ─────────────────────────────────────────────
// StyleMap
// ─────────────────────────────────────────────

/// Directive key → value, keys kept sorted so the prompt serialization is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<String, String>);

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directive, replacing any earlier value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Compact JSON object with sorted keys, e.g. `{"concise":"true","tone":"warm"}`.
    pub fn to_prompt_json(&self) -> String {
        // A map of strings always serializes.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Deref for StyleMap {
    type Target = BTreeMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StyleMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// ─────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────

/// Extract every style directive from `text`.
///
/// Tags are read left to right; a later tag overrides an earlier one on the
/// same key. Malformed fragments are skipped, so this never fails.
pub fn parse(text: &str) -> StyleMap {
    let mut styles = StyleMap::new();

    for caps in style_tag_re().captures_iter(text) {
        let body = &caps[1];
        for fragment in body.split(',') {
            apply_fragment(&mut styles, fragment);
        }
    }

    styles
}

fn apply_fragment(styles: &mut StyleMap, fragment: &str) {
    match fragment.split_once(':') {
        Some((key, value)) => {
            let key = key.trim();
            if !key.is_empty() {
                styles.insert(key, value.trim());
            }
        }
        None => {
            let key = fragment.trim();
            if !key.is_empty() {
                styles.insert(key, FLAG_VALUE);
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
