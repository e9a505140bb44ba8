use serde::{Deserialize, Serialize};

use super::placeholder::{placeholders, NameKind};

/// Placeholder names that cannot be used as variables.
///
/// Informational only: the caller decides whether a violation blocks
/// submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameViolations {
    /// Trimmed names containing internal whitespace, first occurrence order.
    pub names_with_spaces: Vec<String>,
}

impl NameViolations {
    pub fn is_empty(&self) -> bool {
        self.names_with_spaces.is_empty()
    }

    fn push_unique(&mut self, name: &str) {
        if !self.names_with_spaces.iter().any(|n| n == name) {
            self.names_with_spaces.push(name.to_string());
        }
    }
}

/// Report every multi-word placeholder name in `template`.
pub fn find_name_violations(template: &str) -> NameViolations {
    let mut violations = NameViolations::default();
    collect_into(template, &mut violations);
    violations
}

/// [`find_name_violations`] across several templates, deduplicated.
pub fn find_name_violations_multi<S: AsRef<str>>(templates: &[S]) -> NameViolations {
    let mut violations = NameViolations::default();
    for template in templates {
        collect_into(template.as_ref(), &mut violations);
    }
    violations
}

fn collect_into(template: &str, violations: &mut NameViolations) {
    for p in placeholders(template) {
        if p.kind() == NameKind::ContainsWhitespace {
            violations.push_unique(p.name());
        }
    }
}
