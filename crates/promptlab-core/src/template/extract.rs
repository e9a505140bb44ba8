use serde::Serialize;

use super::placeholder::placeholders;

/// Ordered set of unique, valid variable names referenced by a template.
///
/// Order is first occurrence; duplicates collapse by exact string equality.
/// Two sets are equal only if they hold the same names in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableSet {
    names: Vec<String>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` unless already present. Returns whether it was added.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

impl<S: Into<String>> FromIterator<S> for VariableSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = VariableSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for VariableSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

impl<'a> IntoIterator for &'a VariableSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Extract the valid variable names of a single template.
///
/// Names that are empty or contain internal whitespace are left out; see
/// [`find_name_violations`](super::find_name_violations) for reporting them.
pub fn extract_variables(template: &str) -> VariableSet {
    placeholders(template)
        .filter(|p| p.is_valid())
        .map(|p| p.name())
        .collect()
}

/// Union of [`extract_variables`] over several templates, in template order.
pub fn extract_variables_multi<S: AsRef<str>>(templates: &[S]) -> VariableSet {
    let mut set = VariableSet::new();
    for template in templates {
        set.extend(extract_variables(template.as_ref()).names);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_first_occurrence_order() {
        let vars = extract_variables("Hello {{ name }}, your score is {{ score }}");
        assert_eq!(vars.as_slice(), &["name", "score"]);
    }

    #[test]
    fn duplicates_collapse() {
        let vars = extract_variables("{{ a }} and {{ a }} again");
        assert_eq!(vars.as_slice(), &["a"]);
    }

    #[test]
    fn whitespace_variants_are_the_same_name() {
        let vars = extract_variables("{{a}} {{ a }} {{   a\t}}");
        assert_eq!(vars.as_slice(), &["a"]);
    }

    #[test]
    fn names_are_case_sensitive() {
        let vars = extract_variables("{{ Name }} {{ name }}");
        assert_eq!(vars.as_slice(), &["Name", "name"]);
    }

    #[test]
    fn invalid_names_excluded() {
        let vars = extract_variables("{{ first name }} {{ }} {{}} {{ ok }}");
        assert_eq!(vars.as_slice(), &["ok"]);
    }

    #[test]
    fn empty_template_has_no_variables() {
        assert!(extract_variables("").is_empty());
    }

    #[test]
    fn multi_unions_across_templates() {
        let vars = extract_variables_multi(&["Hi {{ a }}", "Bye {{ b }}, {{ a }}"]);
        assert_eq!(vars.as_slice(), &["a", "b"]);
    }

    #[test]
    fn multi_with_no_templates_is_empty() {
        let templates: [&str; 0] = [];
        assert!(extract_variables_multi(&templates).is_empty());
    }

    #[test]
    fn insert_reports_novelty() {
        let mut set = VariableSet::new();
        assert!(set.insert("x"));
        assert!(!set.insert("x"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let ab: VariableSet = ["a", "b"].into_iter().collect();
        let ba: VariableSet = ["b", "a"].into_iter().collect();
        assert_ne!(ab, ba);
    }
}
