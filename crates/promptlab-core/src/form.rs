//! "Create run" form state built on top of the input-value stores.
//!
//! The form owns two independent stores, one for the basic single-template
//! tab and one for the multi-prompt tab. [`RunForm::mode`] selects which one
//! feeds the readiness checks and the run request.
//!
//! Readiness checks return the first [`Blocker`] in a fixed order so a UI
//! can show one reason next to a disabled button.

use std::time::Instant;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ModelParameters, PromptLabConfig};
use crate::run_name::{duplicated_run_name, random_run_name};
use crate::store::{InputValueStore, InputValues};
use crate::template::{
    compile_input_texts, extract_variables_multi, insert_new_variable, insert_placeholder,
    new_variable_name, InsertedVariable, NameViolations, VariableSet,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    #[default]
    Basic,
    MultiPrompt,
}

/// Why a form action is currently unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Blocker {
    #[error("You need to select a served model endpoint using dropdown first")]
    NoModelSelected,

    #[error("You need to provide a prompt template")]
    NoTemplate,

    #[error("You need to provide values for all defined inputs (missing: {})", .0.join(", "))]
    MissingInputValues(Vec<String>),

    #[error("You need to evaluate the resulting output first")]
    NotEvaluated,

    #[error("Input data or prompt template have changed since last evaluation of the output")]
    OutputDirty,

    #[error("You need to define at least one input variable")]
    NoInputVariables,

    #[error("Please provide run name")]
    NoRunName,

    #[error("The last evaluation failed: {0}")]
    EvaluationFailed(String),
}

/// Settings of an earlier run used to prefill a duplicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorRun {
    pub run_name: String,
    pub prompt_template: Option<String>,
    pub route_name: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// Payload for the run-creation backend call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRunRequest {
    pub experiment_id: String,
    pub run_name: String,
    pub prompt_templates: Vec<String>,
    /// One compiled input per template, same order.
    pub model_inputs: Vec<String>,
    pub model_route_names: Vec<String>,
    pub model_parameters: ModelParameters,
    pub prompt_parameters: InputValues,
    pub model_output: Option<String>,
    /// Metadata reported with the evaluation output, e.g. token usage.
    pub model_output_parameters: OutputMetadata,
}

/// Free-form key/value metadata attached to an evaluation output.
pub type OutputMetadata = std::collections::BTreeMap<String, String>;

#[derive(Debug)]
pub struct RunForm {
    mode: FormMode,
    template: String,
    multi_templates: Vec<String>,
    basic: InputValueStore,
    multi: InputValueStore,
    available_models: Vec<String>,
    selected_models: Vec<String>,
    run_name: String,
    parameters: ModelParameters,
    new_variable_base: String,
    evaluation_output: Option<String>,
    output_metadata: OutputMetadata,
    output_dirty: bool,
    last_evaluation_error: Option<String>,
}

impl RunForm {
    /// Fresh form: configured default template (already parsed), default
    /// values, one empty multi-prompt template and a random run name.
    pub fn new(config: &PromptLabConfig) -> Self {
        let store = || {
            InputValueStore::with_delay(config.debounce())
                .with_values(config.default_values.clone())
        };
        let mut basic = store();
        basic.recompute_variables(&config.default_template);

        Self {
            mode: FormMode::Basic,
            template: config.default_template.clone(),
            multi_templates: vec![String::new()],
            basic,
            multi: store(),
            available_models: config.models.clone(),
            selected_models: Vec::new(),
            run_name: random_run_name(),
            parameters: config.parameters,
            new_variable_base: config.new_variable_name.clone(),
            evaluation_output: None,
            output_metadata: OutputMetadata::new(),
            output_dirty: false,
            last_evaluation_error: None,
        }
    }

    // -- Mode and templates --

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: FormMode) {
        if self.mode != mode {
            self.mode = mode;
            self.mark_dirty();
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn multi_templates(&self) -> &[String] {
        &self.multi_templates
    }

    /// Templates submitted in the current mode.
    pub fn active_templates(&self) -> &[String] {
        match self.mode {
            FormMode::Basic => std::slice::from_ref(&self.template),
            FormMode::MultiPrompt => &self.multi_templates,
        }
    }

    /// Replace the basic template; variables follow after the debounce delay.
    pub fn set_template(&mut self, text: impl Into<String>, now: Instant) {
        self.template = text.into();
        self.basic.schedule_recompute(vec![self.template.clone()], now);
        self.mark_dirty();
    }

    /// Replace one multi-prompt template. Returns `false` if `index` is out
    /// of range.
    pub fn set_multi_template(
        &mut self,
        index: usize,
        text: impl Into<String>,
        now: Instant,
    ) -> bool {
        let Some(slot) = self.multi_templates.get_mut(index) else {
            return false;
        };
        *slot = text.into();
        self.schedule_multi(now);
        true
    }

    pub fn add_multi_template(&mut self, now: Instant) {
        self.multi_templates.push(String::new());
        self.schedule_multi(now);
    }

    /// Remove one multi-prompt template. The last one cannot be removed.
    pub fn remove_multi_template(&mut self, index: usize, now: Instant) -> bool {
        if self.multi_templates.len() <= 1 || index >= self.multi_templates.len() {
            return false;
        }
        self.multi_templates.remove(index);
        self.schedule_multi(now);
        true
    }

    fn schedule_multi(&mut self, now: Instant) {
        self.multi.schedule_recompute(self.multi_templates.clone(), now);
        self.mark_dirty();
    }

    /// Insert a fresh placeholder into the basic template at `cursor`.
    pub fn add_variable(&mut self, cursor: Option<usize>, now: Instant) -> InsertedVariable {
        let inserted = insert_new_variable(&self.template, cursor, &self.new_variable_base);
        self.set_template(inserted.template.clone(), now);
        inserted
    }

    /// Insert a fresh placeholder into multi-prompt template `index`. The
    /// name is unique across all multi-prompt templates.
    pub fn add_variable_to_multi(
        &mut self,
        index: usize,
        cursor: Option<usize>,
        now: Instant,
    ) -> Option<InsertedVariable> {
        let existing = extract_variables_multi(&self.multi_templates);
        let name = new_variable_name(&existing, &self.new_variable_base);
        let target = self.multi_templates.get(index)?;
        let inserted = insert_placeholder(target, cursor, name);
        self.set_multi_template(index, inserted.template.clone(), now);
        Some(inserted)
    }

    /// Run debounced recomputes that are due. Returns whether any variable
    /// set changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let basic = self.basic.flush_due(now);
        let multi = self.multi.flush_due(now);
        basic || multi
    }

    /// Run all pending recomputes immediately.
    pub fn flush(&mut self) -> bool {
        let basic = self.basic.flush_pending();
        let multi = self.multi.flush_pending();
        basic || multi
    }

    /// Earliest pending recompute deadline across both stores.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.basic.next_deadline(), self.multi.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // -- Input values --

    fn active_store(&self) -> &InputValueStore {
        match self.mode {
            FormMode::Basic => &self.basic,
            FormMode::MultiPrompt => &self.multi,
        }
    }

    fn active_store_mut(&mut self) -> &mut InputValueStore {
        match self.mode {
            FormMode::Basic => &mut self.basic,
            FormMode::MultiPrompt => &mut self.multi,
        }
    }

    pub fn variables(&self) -> &VariableSet {
        self.active_store().variables()
    }

    pub fn violations(&self) -> &NameViolations {
        self.active_store().violations()
    }

    /// Sanitized values of the active store.
    pub fn input_values(&self) -> InputValues {
        self.active_store().sanitized_values()
    }

    pub fn update_input_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.active_store_mut().update_value(name, value);
        self.mark_dirty();
    }

    pub fn clear_input_values(&mut self) {
        self.active_store_mut().clear_values();
        self.mark_dirty();
    }

    /// Every variable of the active mode has a non-blank value.
    pub fn all_input_values_provided(&self) -> bool {
        self.active_store().missing_values().is_empty()
    }

    // -- Models, name, parameters --

    pub fn available_models(&self) -> &[String] {
        &self.available_models
    }

    pub fn selected_models(&self) -> &[String] {
        &self.selected_models
    }

    /// Select or deselect a model. Returns `false` for unknown models.
    pub fn toggle_model(&mut self, name: &str) -> bool {
        if !self.available_models.iter().any(|m| m == name) {
            return false;
        }
        if let Some(pos) = self.selected_models.iter().position(|m| m == name) {
            self.selected_models.remove(pos);
        } else {
            self.selected_models.push(name.to_string());
        }
        self.mark_dirty();
        true
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn set_run_name(&mut self, name: impl Into<String>) {
        self.run_name = name.into();
    }

    pub fn parameters(&self) -> ModelParameters {
        self.parameters
    }

    pub fn set_parameters(&mut self, parameters: ModelParameters) {
        if self.parameters != parameters {
            self.parameters = parameters;
            self.mark_dirty();
        }
    }

    // -- Evaluation output --

    /// Store the output of an evaluation; the form is in sync again.
    pub fn record_evaluation(&mut self, output: impl Into<String>) {
        self.record_evaluation_with_metadata(output, OutputMetadata::new());
    }

    /// [`record_evaluation`](Self::record_evaluation) plus the metadata the
    /// model returned, forwarded with the run request.
    pub fn record_evaluation_with_metadata(
        &mut self,
        output: impl Into<String>,
        metadata: OutputMetadata,
    ) {
        self.evaluation_output = Some(output.into());
        self.output_metadata = metadata;
        self.output_dirty = false;
        self.last_evaluation_error = None;
    }

    pub fn record_evaluation_error(&mut self, message: impl Into<String>) {
        self.last_evaluation_error = Some(message.into());
    }

    pub fn evaluation_output(&self) -> Option<&str> {
        self.evaluation_output.as_deref()
    }

    pub fn output_metadata(&self) -> &OutputMetadata {
        &self.output_metadata
    }

    pub fn is_output_dirty(&self) -> bool {
        self.output_dirty
    }

    fn mark_dirty(&mut self) {
        if self.evaluation_output.is_some() {
            self.output_dirty = true;
        }
    }

    // -- Duplication --

    /// Prefill the form from an earlier run. Input values and evaluation
    /// output are cleared; the run name becomes the next free copy name.
    pub fn duplicate_from<S: AsRef<str>>(
        &mut self,
        prior: &PriorRun,
        existing_run_names: &[S],
        now: Instant,
    ) {
        self.mode = FormMode::Basic;
        if let Some(template) = &prior.prompt_template {
            self.set_template(template.clone(), now);
        }
        if let Some(temperature) = prior.temperature {
            self.parameters.temperature = temperature;
        }
        if let Some(max_tokens) = prior.max_tokens {
            self.parameters.max_tokens = max_tokens;
        }
        if let Some(route) = &prior.route_name {
            if !self.available_models.contains(route) {
                warn!(model = %route, "prior run model is not configured, leaving it unselected");
            } else if !self.selected_models.contains(route) {
                self.selected_models.push(route.clone());
            }
        }
        self.evaluation_output = None;
        self.output_metadata.clear();
        self.output_dirty = false;
        self.last_evaluation_error = None;
        self.run_name = duplicated_run_name(&prior.run_name, existing_run_names);
        self.basic.clear_values();
        debug!(run_name = %self.run_name, "form prefilled from prior run");
    }

    // -- Readiness --

    fn templates_provided(&self) -> bool {
        self.active_templates().iter().all(|t| !t.trim().is_empty())
    }

    fn input_blocker(&self) -> Option<Blocker> {
        if self.selected_models.is_empty() {
            return Some(Blocker::NoModelSelected);
        }
        if !self.templates_provided() {
            return Some(Blocker::NoTemplate);
        }
        let missing = self.active_store().missing_values();
        if !missing.is_empty() {
            return Some(Blocker::MissingInputValues(
                missing.into_iter().map(String::from).collect(),
            ));
        }
        None
    }

    /// First reason the form cannot be evaluated yet. Evaluating without any
    /// input variables is allowed.
    pub fn evaluate_blocker(&self) -> Option<Blocker> {
        self.input_blocker()
    }

    /// First reason a run cannot be created yet.
    pub fn create_run_blocker(&self) -> Option<Blocker> {
        if let Some(blocker) = self.input_blocker() {
            return Some(blocker);
        }
        if self.evaluation_output.is_none() {
            return Some(Blocker::NotEvaluated);
        }
        if self.output_dirty {
            return Some(Blocker::OutputDirty);
        }
        if self.variables().is_empty() {
            return Some(Blocker::NoInputVariables);
        }
        if self.run_name.trim().is_empty() {
            return Some(Blocker::NoRunName);
        }
        if let Some(error) = &self.last_evaluation_error {
            return Some(Blocker::EvaluationFailed(error.clone()));
        }
        None
    }

    /// Flush pending recomputes, check readiness and compile every active
    /// template with the sanitized values.
    pub fn build_request(
        &mut self,
        experiment_id: impl Into<String>,
    ) -> Result<CreateRunRequest, Blocker> {
        self.flush();
        if let Some(blocker) = self.create_run_blocker() {
            return Err(blocker);
        }
        let values = self.input_values();
        let templates = self.active_templates().to_vec();
        let request = CreateRunRequest {
            experiment_id: experiment_id.into(),
            run_name: self.run_name.trim().to_string(),
            model_inputs: compile_input_texts(&templates, &values),
            prompt_templates: templates,
            model_route_names: self.selected_models.clone(),
            model_parameters: self.parameters,
            prompt_parameters: values,
            model_output: self.evaluation_output.clone(),
            model_output_parameters: self.output_metadata.clone(),
        };
        debug!(
            run_name = %request.run_name,
            templates = request.prompt_templates.len(),
            "run request built"
        );
        Ok(request)
    }
}

/// Declarative form contents, e.g. loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormDescription {
    pub mode: FormMode,
    /// Basic-mode template; the configured default when absent.
    pub template: Option<String>,
    /// Multi-prompt templates.
    pub templates: Vec<String>,
    pub models: Vec<String>,
    pub run_name: Option<String>,
    pub values: InputValues,
    pub parameters: Option<ModelParameters>,
    /// Output of an evaluation already performed with these inputs.
    pub output: Option<String>,
    /// Metadata of that evaluation.
    pub output_metadata: OutputMetadata,
}

impl RunForm {
    /// Build a form from a description, with every recompute applied.
    ///
    /// # Errors
    ///
    /// Fails if a listed model is not in the configured model list.
    pub fn from_description(config: &PromptLabConfig, desc: FormDescription) -> Result<Self> {
        let now = Instant::now();
        let mut form = RunForm::new(config);
        form.set_mode(desc.mode);
        if let Some(template) = desc.template {
            form.set_template(template, now);
        }
        if !desc.templates.is_empty() {
            form.multi_templates = desc.templates;
            form.schedule_multi(now);
        }
        form.flush();

        for (name, value) in desc.values {
            form.update_input_value(name, value);
        }
        for model in &desc.models {
            if !form.toggle_model(model) {
                bail!(
                    "unknown model '{model}' (available: {})",
                    form.available_models.join(", ")
                );
            }
        }
        if let Some(run_name) = desc.run_name {
            form.set_run_name(run_name);
        }
        if let Some(parameters) = desc.parameters {
            form.set_parameters(parameters);
        }
        if let Some(output) = desc.output {
            form.record_evaluation_with_metadata(output, desc.output_metadata);
        }
        Ok(form)
    }
}
