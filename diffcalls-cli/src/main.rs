//! diffcalls CLI - change statistics and call frequencies for unified diffs.
//!
//! Features:
//! - Files, hunks and added/deleted line counts across a directory of diffs
//! - Call-name frequency table split into added, removed and context tallies
//! - Rayon-powered parallel ingestion with a deterministic merged result
//! - Plain text or JSON reports
//! - Variable declarations from a serialized syntax tree (`--ast`)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use diffcalls_core::{
    collect_variable_declarations, init_structured_logging, load_config, load_config_file,
    load_syntax_tree, print_json, print_plain, render_declarations, BatchOutcome, ContextPolicy,
    DiffCalls, DiffcallsConfig,
};

/// Exit code when at least one diff file was skipped.
const EXIT_FAILURES: i32 = 1;
/// Exit code for errors that stop the run.
const EXIT_FATAL: i32 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Change statistics and call frequencies for unified diffs")]
pub struct Cli {
    /// Directory containing the diff files
    #[arg(default_value = "./diffs")]
    path: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Descend into subdirectories
    #[arg(long, short)]
    recursive: bool,

    /// Only read files with these extensions (default: every regular file)
    #[arg(long = "ext", value_name = "EXT", num_args = 1..)]
    extensions: Vec<String>,

    /// Read every regular file, ignoring any configured extension filter
    #[arg(long, conflicts_with = "extensions")]
    all_files: bool,

    /// Directory names to skip while walking
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,

    /// Extra names never reported as calls
    #[arg(long = "keyword", value_name = "NAME", num_args = 1..)]
    keywords: Vec<String>,

    /// How calls on context lines are tallied: both | neither
    #[arg(long, value_name = "POLICY")]
    context_policy: Option<ContextPolicy>,

    /// Process files one at a time instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Configuration file (default: ./diffcalls.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print variable declarations from a syntax tree JSON file and exit
    #[arg(long, value_name = "FILE")]
    ast: Option<PathBuf>,
}

/// Loads the explicit config file, or diffcalls.toml from the working
/// directory when one exists.
fn resolve_config(cli: &Cli) -> Result<DiffcallsConfig> {
    let config = match &cli.config {
        Some(path) => Some(load_config_file(path)?),
        None => load_config(Path::new("."))?,
    };
    Ok(config.unwrap_or_default())
}

/// Configuration first, then command-line flags on top.
fn build_batch(cli: &Cli, config: &DiffcallsConfig) -> DiffCalls {
    let mut batch = DiffCalls::new(&cli.path)
        .with_config(config)
        .exclude_dirs(cli.exclude.iter().cloned())
        .keywords(cli.keywords.iter().cloned())
        .parallel(!cli.sequential);

    if cli.recursive {
        batch = batch.recursive(true);
    }
    if cli.all_files {
        batch = batch.extensions(Vec::<String>::new());
    } else if !cli.extensions.is_empty() {
        batch = batch.extensions(cli.extensions.iter().cloned());
    }
    if let Some(policy) = cli.context_policy {
        batch = batch.context_policy(policy);
    }
    batch
}

fn exit_code(outcome: &BatchOutcome) -> i32 {
    if outcome.has_failures() {
        EXIT_FAILURES
    } else {
        0
    }
}

fn run_ast(path: &Path, json: bool) -> Result<i32> {
    let doc = load_syntax_tree(path)
        .with_context(|| format!("Failed to load syntax tree from {}", path.display()))?;
    let decls = collect_variable_declarations(&doc.root);

    if json {
        let rows: Vec<_> = decls
            .iter()
            .map(|d| serde_json::json!({ "type": d.type_name, "name": d.name }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render_declarations(&decls));
    }
    Ok(0)
}

fn run(cli: &Cli) -> Result<i32> {
    if let Some(ast) = &cli.ast {
        return run_ast(ast, cli.json);
    }

    let config = resolve_config(cli)?;
    let outcome = build_batch(cli, &config).run()?;

    if cli.json || config.wants_json() {
        print_json(&outcome);
    } else {
        print_plain(&outcome);
    }
    Ok(exit_code(&outcome))
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] diffcalls internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code {}.", EXIT_FATAL);
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_FATAL);
        }
    }
}
