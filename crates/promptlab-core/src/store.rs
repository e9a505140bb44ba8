//! Input-value store: the values a user typed for each template variable,
//! kept in step with the variables the current template(s) reference.
//!
//! Stored values are never dropped when a variable disappears from the
//! template. They are hidden from [`InputValueStore::sanitized_values`] and
//! come back if the placeholder is added again.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::template::{
    extract_variables_multi, find_name_violations_multi, NameViolations, VariableSet,
};

/// Variable name → entered value.
pub type InputValues = BTreeMap<String, String>;

#[derive(Debug)]
pub struct InputValueStore {
    variables: VariableSet,
    violations: NameViolations,
    values: InputValues,
    pending: Debouncer<Vec<String>>,
}

impl InputValueStore {
    /// Empty store with the default debounce delay.
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            variables: VariableSet::new(),
            violations: NameViolations::default(),
            values: InputValues::new(),
            pending: Debouncer::new(delay),
        }
    }

    /// Seed the stored values, e.g. with configured defaults.
    pub fn with_values(mut self, values: InputValues) -> Self {
        self.values = values;
        self
    }

    /// Variables referenced by the template(s) at the last recompute.
    pub fn variables(&self) -> &VariableSet {
        &self.variables
    }

    pub fn violations(&self) -> &NameViolations {
        &self.violations
    }

    /// Set one value. Other entries and the variable set are untouched.
    pub fn update_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn clear_values(&mut self) {
        self.values.clear();
    }

    /// Stored values restricted to the current variable set.
    pub fn sanitized_values(&self) -> InputValues {
        self.values
            .iter()
            .filter(|(name, _)| self.variables.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Sanitized value of a single variable.
    pub fn value(&self, name: &str) -> Option<&str> {
        if !self.variables.contains(name) {
            return None;
        }
        self.values.get(name).map(String::as_str)
    }

    /// Current variables with no value or a whitespace-only value.
    pub fn missing_values(&self) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|name| self.value(name).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }

    /// Recompute from one template. Returns whether the variable set changed.
    pub fn recompute_variables(&mut self, template: &str) -> bool {
        self.recompute_variables_multi(&[template])
    }

    /// Recompute from several templates (union of their variables).
    ///
    /// The stored set is only replaced when the new one differs in elements
    /// or order. Returns whether it changed.
    pub fn recompute_variables_multi<S: AsRef<str>>(&mut self, templates: &[S]) -> bool {
        let violations = find_name_violations_multi(templates);
        if violations != self.violations {
            debug!(names = ?violations.names_with_spaces, "name violations changed");
            self.violations = violations;
        }

        let variables = extract_variables_multi(templates);
        if variables == self.variables {
            return false;
        }
        debug!(
            before = ?self.variables.as_slice(),
            after = ?variables.as_slice(),
            "input variables changed"
        );
        self.variables = variables;
        true
    }

    /// Debounced [`recompute_variables_multi`](Self::recompute_variables_multi).
    ///
    /// Supersedes any pending recompute; nothing happens until
    /// [`flush_due`](Self::flush_due) is called at or after the deadline.
    pub fn schedule_recompute(&mut self, templates: Vec<String>, now: Instant) {
        self.pending.schedule(templates, now);
    }

    /// Run the pending recompute if it is due. Returns whether the variable
    /// set changed.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        match self.pending.take_due(now) {
            Some(templates) => self.recompute_variables_multi(&templates),
            None => false,
        }
    }

    /// Run the pending recompute immediately, if any.
    pub fn flush_pending(&mut self) -> bool {
        match self.pending.flush() {
            Some(templates) => self.recompute_variables_multi(&templates),
            None => false,
        }
    }

    pub fn cancel_pending(&mut self) {
        self.pending.cancel();
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Deadline of the pending recompute, for scheduling the next poll.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.deadline()
    }
}

impl Default for InputValueStore {
    fn default() -> Self {
        Self::new()
    }
}
