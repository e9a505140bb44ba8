use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::template::{classify_name, NameKind};

pub const DEFAULT_NEW_VARIABLE_NAME: &str = "new_variable";

pub const DEFAULT_TEMPLATE: &str = "You are a marketing consultant for a technology company. \
Develop a marketing strategy report for {{ company_name }} aiming to {{ company_goal }}";

/// Top-level promptlab configuration (`config.toml`).
///
/// Every field is optional in the file; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptLabConfig {
    /// Debounce window for template edits, in milliseconds.
    pub debounce_ms: u64,

    /// Base name used by "add new variable".
    pub new_variable_name: String,

    /// Template a fresh form starts with.
    pub default_template: String,

    /// Model endpoints that can be selected.
    pub models: Vec<String>,

    // Tables last so the TOML serializer can emit them.
    /// Values pre-filled into a fresh input-value store.
    pub default_values: BTreeMap<String, String>,

    pub parameters: ModelParameters,
}

impl Default for PromptLabConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            new_variable_name: DEFAULT_NEW_VARIABLE_NAME.to_string(),
            default_template: DEFAULT_TEMPLATE.to_string(),
            models: ["GPT-3", "GPT-4", "ALPHA-LLM", "GEMINI"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_values: [
                ("company_name", "Acme Corp"),
                ("company_goal", "Increase top-line revenue"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            parameters: ModelParameters::default(),
        }
    }
}

impl PromptLabConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Replace settings that would produce unusable templates.
    pub fn sanitized(mut self) -> Self {
        let name = self.new_variable_name.trim().to_string();
        let has_braces = name.contains(|c: char| c == '{' || c == '}');
        if classify_name(&name) != NameKind::Valid || has_braces {
            warn!(variable = %name, "invalid new_variable_name, using default");
            self.new_variable_name = DEFAULT_NEW_VARIABLE_NAME.to_string();
        } else {
            self.new_variable_name = name;
        }
        self
    }
}

/// Sampling parameters forwarded with a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: 0.01,
            max_tokens: 100,
        }
    }
}
