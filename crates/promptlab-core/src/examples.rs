//! Example prompt templates embedded in the binary.
//!
//! Each `prompts/<name>.txt` file becomes one [`PromptExample`] named after
//! its file stem.

use std::sync::OnceLock;

use include_dir::{include_dir, Dir};
use tracing::warn;

static PROMPTS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/prompts");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptExample {
    pub name: String,
    pub template: String,
}

/// All embedded examples, sorted by name. Parsed once.
pub fn examples() -> &'static [PromptExample] {
    static CACHE: OnceLock<Vec<PromptExample>> = OnceLock::new();
    CACHE.get_or_init(load_embedded_examples)
}

/// Look up an embedded example by name.
pub fn example(name: &str) -> Option<&'static PromptExample> {
    examples().iter().find(|e| e.name == name)
}

fn load_embedded_examples() -> Vec<PromptExample> {
    let mut out = Vec::new();
    for file in PROMPTS_DIR.files() {
        let path = file.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match file.contents_utf8() {
            Some(contents) => out.push(PromptExample {
                name: name.to_string(),
                template: contents.trim_end().to_string(),
            }),
            None => warn!(path = %path.display(), "skipping non-UTF-8 example"),
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}
