mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter, e.g. `PROMPTLAB_LOG=debug`.
const LOG_ENV: &str = "PROMPTLAB_LOG";

#[derive(Parser)]
#[command(name = "promptlab", version, about = "Prompt template workbench")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the input variables of one or more templates.
    Vars {
        /// Template text (reads stdin when neither templates nor files are given)
        templates: Vec<String>,

        /// Read a template from a file (repeatable)
        #[arg(short = 'f', long = "file")]
        files: Vec<PathBuf>,

        /// Print variables and violations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Substitute input values into one or more templates.
    Compile {
        /// Template text (reads stdin when neither templates nor files are given)
        templates: Vec<String>,

        /// Read a template from a file (repeatable)
        #[arg(short = 'f', long = "file")]
        files: Vec<PathBuf>,

        /// Input value as `name=value` (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        /// TOML table of input values
        #[arg(long)]
        values: Option<PathBuf>,
    },

    /// Insert a fresh `{{ variable }}` placeholder into a template.
    AddVar {
        template: String,

        /// Byte offset to insert at (appends when omitted)
        #[arg(long)]
        cursor: Option<usize>,
    },

    /// List the built-in example templates, or print one.
    Examples { name: Option<String> },

    /// Check a run form description and print the run request as JSON.
    Request {
        /// Form description (TOML)
        form: PathBuf,

        #[arg(long, default_value = "0")]
        experiment_id: String,
    },

    /// Generate a run name, or the name for a copy of an existing run.
    RunName {
        /// Name of the run being duplicated
        #[arg(long)]
        duplicate: Option<String>,

        /// Run names already taken (repeatable)
        #[arg(long)]
        existing: Vec<String>,
    },

    /// Print the resolved configuration.
    Config,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("promptlab: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Vars {
            templates,
            files,
            json,
        } => commands::cmd_vars(templates, &files, json),
        Commands::Compile {
            templates,
            files,
            vars,
            values,
        } => commands::cmd_compile(templates, &files, &vars, values.as_deref()),
        Commands::AddVar { template, cursor } => commands::cmd_add_var(&template, cursor),
        Commands::Examples { name } => commands::cmd_examples(name.as_deref()),
        Commands::Request {
            form,
            experiment_id,
        } => commands::cmd_request(&form, &experiment_id),
        Commands::RunName {
            duplicate,
            existing,
        } => commands::cmd_run_name(duplicate.as_deref(), &existing),
        Commands::Config => commands::cmd_config(),
    }
}
