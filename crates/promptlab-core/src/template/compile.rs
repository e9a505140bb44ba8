use std::collections::BTreeMap;

use super::placeholder::placeholders;

/// Substitute every placeholder in `template` with the value of its trimmed
/// name. Missing values become the empty string.
pub fn compile_input_text(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for p in placeholders(template) {
        out.push_str(&template[last..p.start]);
        if let Some(value) = values.get(p.name()) {
            out.push_str(value);
        }
        last = p.end;
    }
    out.push_str(&template[last..]);
    out
}

/// Compile each template with the same values.
pub fn compile_input_texts<S: AsRef<str>>(
    templates: &[S],
    values: &BTreeMap<String, String>,
) -> Vec<String> {
    templates
        .iter()
        .map(|t| compile_input_text(t.as_ref(), values))
        .collect()
}
