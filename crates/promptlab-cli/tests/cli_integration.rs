use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Runs in an empty directory with an empty HOME so no stray config is picked up.
fn promptlab_bin(sandbox: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_promptlab"));
    cmd.current_dir(sandbox.path())
        .env("HOME", sandbox.path())
        .env_remove("PROMPTLAB_CONFIG")
        .env_remove("PROMPTLAB_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    let sandbox = TempDir::new().unwrap();
    promptlab_bin(&sandbox)
        .args(args)
        .output()
        .expect("failed to execute promptlab")
}

#[test]
fn vars_lists_in_order() {
    let output = run(&["vars", "Hello {{ name }}, your score is {{ score }} {{ name }}"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "name\nscore\n");
}

#[test]
fn vars_reports_violations_on_stderr() {
    let output = run(&["vars", "{{ first name }} {{ ok }}"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stdout, "ok\n");
    assert!(
        stderr.contains("'first name'"),
        "Expected violation warning, got: {stderr}"
    );
}

#[test]
fn vars_json_for_multiple_templates() {
    let output = run(&["vars", "--json", "Hi {{ a }}", "Bye {{ b }}, {{ a }} {{ x y }}"]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["variables"], serde_json::json!(["a", "b"]));
    assert_eq!(
        report["violations"]["names_with_spaces"],
        serde_json::json!(["x y"])
    );
}

#[test]
fn vars_reads_stdin() {
    let sandbox = TempDir::new().unwrap();
    let mut child = promptlab_bin(&sandbox)
        .arg("vars")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn promptlab");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Summarize {{ text }} for {{ audience }}")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "text\naudience\n");
}

#[test]
fn compile_with_vars() {
    let output = run(&["compile", "Hi {{ name }}!", "--var", "name=Bob"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hi Bob!\n");
}

#[test]
fn compile_missing_value_is_empty_with_warning() {
    let output = run(&["compile", "Hi {{ name }}!"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hi !\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no value provided"), "got: {stderr}");
}

#[test]
fn compile_uses_default_values() {
    let output = run(&["compile", "{{ company_name }}"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Acme Corp\n");
}

#[test]
fn compile_values_file_and_override() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(
        sandbox.path().join("values.toml"),
        "name = \"Bob\"\ncity = \"Oslo\"\n",
    )
    .unwrap();
    let output = promptlab_bin(&sandbox)
        .args([
            "compile",
            "{{ name }} from {{ city }}",
            "--values",
            "values.toml",
            "--var",
            "city=Bergen",
        ])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Bob from Bergen\n");
}

#[test]
fn compile_bad_var_fails() {
    let output = run(&["compile", "x", "--var", "novalue"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected NAME=VALUE"), "got: {stderr}");
}

#[test]
fn add_var_appends_placeholder() {
    let output = run(&["add-var", "Hello {{ new_variable }} "]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Hello {{ new_variable }} {{ new_variable_2 }}\n"
    );
}

#[test]
fn add_var_at_cursor() {
    let output = run(&["add-var", "Hello world", "--cursor", "6"]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Hello {{ new_variable }}world\n"
    );
}

#[test]
fn examples_list_and_show() {
    let output = run(&["examples"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("question_answering"), "got: {stdout}");
    assert!(stdout.contains("article, question"), "got: {stdout}");

    let output = run(&["examples", "question_answering"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("{{ article }}"), "got: {stdout}");
}

#[test]
fn examples_unknown_fails() {
    let output = run(&["examples", "nope"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no example named 'nope'"));
}

#[test]
fn request_prints_json() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(
        sandbox.path().join("form.toml"),
        r#"
template = "Hi {{ name }}"
models = ["GPT-4"]
run_name = "cli-run"
output = "Hello Bob"

[values]
name = "Bob"

[output_metadata]
total_tokens = "12"
"#,
    )
    .unwrap();
    let output = promptlab_bin(&sandbox)
        .args(["request", "form.toml", "--experiment-id", "7"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let request: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(request["experiment_id"], "7");
    assert_eq!(request["run_name"], "cli-run");
    assert_eq!(request["model_inputs"], serde_json::json!(["Hi Bob"]));
    assert_eq!(request["model_parameters"]["max_tokens"], 100);
    assert_eq!(request["model_output_parameters"]["total_tokens"], "12");
}

#[test]
fn request_reports_first_blocker() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(
        sandbox.path().join("form.toml"),
        "template = \"Hi {{ name }}\"\nmodels = [\"GPT-4\"]\n",
    )
    .unwrap();
    let output = promptlab_bin(&sandbox)
        .args(["request", "form.toml"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("You need to provide values for all defined inputs"),
        "got: {stderr}"
    );
}

#[test]
fn run_name_generate_and_duplicate() {
    let output = run(&["run-name"]);
    assert!(!String::from_utf8_lossy(&output.stdout).trim().is_empty());

    let output = run(&["run-name", "--duplicate", "run (1)", "--existing", "run (1)"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "run (2)\n");
}

#[test]
fn config_shows_defaults() {
    let output = run(&["config"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# source: built-in defaults"), "got: {stdout}");
    assert!(stdout.contains("debounce_ms = 250"), "got: {stdout}");
}

#[test]
fn config_from_env_file() {
    let sandbox = TempDir::new().unwrap();
    let path = sandbox.path().join("custom.toml");
    std::fs::write(&path, "debounce_ms = 500\nnew_variable_name = \"input\"\n").unwrap();

    let output = promptlab_bin(&sandbox)
        .env("PROMPTLAB_CONFIG", &path)
        .arg("config")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("debounce_ms = 500"), "got: {stdout}");

    let output = promptlab_bin(&sandbox)
        .env("PROMPTLAB_CONFIG", &path)
        .args(["add-var", ""])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "{{ input }}\n");
}
