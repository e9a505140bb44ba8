use std::ops::Range;

use super::extract::{extract_variables, VariableSet};

/// Result of inserting a fresh placeholder into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedVariable {
    /// Template text after insertion.
    pub template: String,
    /// Name that was inserted.
    pub name: String,
    /// Byte range of `name` inside `template`, for selecting it in an editor.
    pub selection: Range<usize>,
}

/// Pick a variable name based on `base` that is not in `existing`.
///
/// `base` itself when free, otherwise `base_N` where N is one above the
/// highest suffix already used (bare `base` counts as 1). If that suffix
/// would overflow, the lowest free suffix from 2 is used instead.
pub fn new_variable_name(existing: &VariableSet, base: &str) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }
    let prefix = format!("{base}_");
    let highest = existing
        .iter()
        .filter_map(|name| {
            if name == base {
                Some(1)
            } else {
                name.strip_prefix(prefix.as_str())?.parse::<u64>().ok()
            }
        })
        .max()
        .unwrap_or(1);
    if let Some(next) = highest.checked_add(1) {
        return format!("{prefix}{next}");
    }

    let mut n: u64 = 2;
    loop {
        let candidate = format!("{prefix}{n}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Insert a placeholder for a fresh name derived from `base` into `template`.
///
/// See [`insert_placeholder`] for cursor handling.
pub fn insert_new_variable(template: &str, cursor: Option<usize>, base: &str) -> InsertedVariable {
    let name = new_variable_name(&extract_variables(template), base);
    insert_placeholder(template, cursor, name)
}

/// Insert `{{ name }}` at byte offset `cursor` (or at the end when `None`).
///
/// The cursor is clamped to the template length and moved back to the
/// nearest char boundary.
pub fn insert_placeholder(template: &str, cursor: Option<usize>, name: String) -> InsertedVariable {
    let mut at = cursor.map_or(template.len(), |c| c.min(template.len()));
    while !template.is_char_boundary(at) {
        at -= 1;
    }

    let placeholder = format!("{{{{ {name} }}}}");
    let mut text = String::with_capacity(template.len() + placeholder.len());
    text.push_str(&template[..at]);
    text.push_str(&placeholder);
    text.push_str(&template[at..]);

    let name_start = at + "{{ ".len();
    InsertedVariable {
        template: text,
        selection: name_start..name_start + name.len(),
        name,
    }
}
