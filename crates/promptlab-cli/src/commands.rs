//! Subcommand implementations for the promptlab CLI.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use promptlab_core::config::resolve_config;
use promptlab_core::examples::{example, examples};
use promptlab_core::form::FormDescription;
use promptlab_core::run_name::{duplicated_run_name, random_run_name};
use promptlab_core::template::{
    compile_input_texts, find_name_violations_multi, insert_new_variable,
};
use promptlab_core::{
    extract_variables, extract_variables_multi, InputValueStore, InputValues, NameViolations,
    RunForm, VariableSet,
};
use serde::Serialize;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Vars: list input variables
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct VarsReport<'a> {
    variables: &'a VariableSet,
    violations: &'a NameViolations,
}

pub fn cmd_vars(templates: Vec<String>, files: &[PathBuf], json: bool) -> Result<()> {
    let templates = gather_templates(templates, files)?;
    let variables = extract_variables_multi(&templates);
    let violations = find_name_violations_multi(&templates);

    if json {
        let report = VarsReport {
            variables: &variables,
            violations: &violations,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for name in &variables {
        println!("{name}");
    }
    report_violations(&violations);
    Ok(())
}

fn report_violations(violations: &NameViolations) {
    for name in &violations.names_with_spaces {
        eprintln!("warning: '{name}' is not a valid variable name (contains whitespace)");
    }
}

/// Positional templates followed by file contents; stdin when both are empty.
fn gather_templates(mut templates: Vec<String>, files: &[PathBuf]) -> Result<Vec<String>> {
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()))?;
        templates.push(text);
    }
    if templates.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read template from stdin")?;
        templates.push(text);
    }
    Ok(templates)
}

// ---------------------------------------------------------------------------
// Compile: substitute values into templates
// ---------------------------------------------------------------------------

pub fn cmd_compile(
    templates: Vec<String>,
    files: &[PathBuf],
    vars: &[String],
    values_file: Option<&Path>,
) -> Result<()> {
    let templates = gather_templates(templates, files)?;
    let (config, source) = resolve_config();
    debug!(%source, "configuration resolved");

    let mut values = config.default_values;
    if let Some(path) = values_file {
        values.extend(load_values_file(path)?);
    }
    for pair in vars {
        let (name, value) = parse_var(pair)?;
        values.insert(name.to_string(), value.to_string());
    }

    let mut store = InputValueStore::new().with_values(values);
    store.recompute_variables_multi(&templates);
    report_violations(store.violations());
    for name in store.missing_values() {
        warn!(variable = %name, "no value provided, substituting empty text");
    }

    let compiled = compile_input_texts(&templates, &store.sanitized_values());
    for text in &compiled {
        println!("{text}");
    }
    Ok(())
}

fn load_values_file(path: &Path) -> Result<InputValues> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read values file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse values file {}", path.display()))
}

fn parse_var(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => bail!("invalid --var '{pair}': expected NAME=VALUE"),
    }
}

// ---------------------------------------------------------------------------
// AddVar: insert a new placeholder
// ---------------------------------------------------------------------------

pub fn cmd_add_var(template: &str, cursor: Option<usize>) -> Result<()> {
    let (config, _) = resolve_config();
    let inserted = insert_new_variable(template, cursor, &config.new_variable_name);
    debug!(
        variable = %inserted.name,
        start = inserted.selection.start,
        end = inserted.selection.end,
        "placeholder inserted"
    );
    println!("{}", inserted.template);
    Ok(())
}

// ---------------------------------------------------------------------------
// Examples: built-in templates
// ---------------------------------------------------------------------------

pub fn cmd_examples(name: Option<&str>) -> Result<()> {
    let Some(name) = name else {
        for ex in examples() {
            let variables = extract_variables(&ex.template);
            let names: Vec<&str> = variables.iter().collect();
            println!("{:<20} {}", ex.name, names.join(", "));
        }
        return Ok(());
    };

    let ex = example(name).with_context(|| {
        format!("no example named '{name}'. Run `promptlab examples` to see all examples")
    })?;
    println!("{}", ex.template);
    Ok(())
}

// ---------------------------------------------------------------------------
// Request: validate a form and build the run request
// ---------------------------------------------------------------------------

pub fn cmd_request(form_path: &Path, experiment_id: &str) -> Result<()> {
    let contents = std::fs::read_to_string(form_path)
        .with_context(|| format!("failed to read form {}", form_path.display()))?;
    let desc: FormDescription = toml::from_str(&contents)
        .with_context(|| format!("failed to parse form {}", form_path.display()))?;

    let (config, _) = resolve_config();
    let mut form = RunForm::from_description(&config, desc)?;
    report_violations(form.violations());

    let request = form
        .build_request(experiment_id)
        .context("cannot create run")?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// RunName: generate or duplicate
// ---------------------------------------------------------------------------

pub fn cmd_run_name(duplicate: Option<&str>, existing: &[String]) -> Result<()> {
    let name = match duplicate {
        Some(original) => duplicated_run_name(original, existing),
        None => random_run_name(),
    };
    println!("{name}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Config: show resolved configuration
// ---------------------------------------------------------------------------

pub fn cmd_config() -> Result<()> {
    let (config, source) = resolve_config();
    println!("# source: {source}");
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
