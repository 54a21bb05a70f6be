//! Command-line entrypoint: validate widget configurations and evaluate
//! templates against a state snapshot.
use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use navbar_protocol::{AppState, WidgetState};
use serde_json::Value;
use template::{EvalOptions, TemplateContext, TemplateEngine};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "navbar", about = "Navbar widget configuration tools", version)]
/// Command-line interface for the `navbar` binary.
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate a configuration then exit.
    Check {
        /// Path to the configuration file (.json or .ron)
        path: PathBuf,

        /// Dump the parsed configuration as JSON to stdout
        #[arg(long)]
        dump: bool,
    },
    /// Evaluate a template and print the result as JSON.
    Eval {
        /// Template source, with or without the [[[ ]]] delimiters
        template: String,

        /// JSON file holding the host state snapshot
        #[arg(long, value_name = "PATH")]
        state: Option<PathBuf>,

        /// Evaluate with the desktop layout active
        #[arg(long)]
        desktop: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let result = match &cli.command {
        Command::Check { path, dump } => check(path, *dump),
        Command::Eval {
            template,
            state,
            desktop,
        } => eval(template, state.as_deref(), *desktop),
    };
    if let Err(msg) = result {
        eprintln!("{msg}");
        process::exit(1);
    }
}

fn check(path: &Path, dump: bool) -> Result<(), String> {
    let cfg = config::load_from_path(path).map_err(|e| e.pretty())?;
    if dump {
        let json = serde_json::to_string_pretty(&cfg)
            .map_err(|e| format!("Failed to serialize config: {e}"))?;
        println!("{json}");
    } else {
        println!("OK");
    }
    Ok(())
}

fn eval(source: &str, state: Option<&Path>, desktop: bool) -> Result<(), String> {
    let app = match state {
        Some(path) => load_state(path)?,
        None => AppState::default(),
    };
    let widget = WidgetState {
        is_desktop: desktop,
    };
    let ctx = TemplateContext::new(&app, &widget).map_err(|e| e.to_string())?;

    let template = template::wrap_template(source);
    debug!(%template, "evaluating");
    let out = TemplateEngine::shared()
        .evaluate(&ctx, &Value::String(template), EvalOptions::strict())
        .map_err(|e| format!("Template error: {e}"))?;
    let json =
        serde_json::to_string_pretty(&out).map_err(|e| format!("Failed to serialize result: {e}"))?;
    println!("{json}");
    Ok(())
}

fn load_state(path: &Path) -> Result<AppState, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read state {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid state {}: {e}", path.display()))
}
