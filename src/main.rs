//! Binary entry point for the tugdts CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Strip @internal declarations and copy inherited signatures
//! tugdts process dist/types --filter-tag internal --inherit-doc --out bundle.d.ts
//!
//! # Same run, JSON envelope with diagnostics on stdout
//! tugdts process dist/types --inherit-doc --format json
//!
//! # Dump the inheritance graph
//! tugdts graph dist/types
//! ```

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tugdts::cli::{
    collect_inputs, file_summaries, graph_json, load_tree, process_tree, ProcessOptions,
};
use tugdts::config::Config;
use tugdts_ast::render_tree;
use tugdts_core::error::{DtsError, OutputErrorCode};
use tugdts_core::log::{MemoryLogger, TracingLogger};
use tugdts_core::output::{emit_response, AbortInfo, ErrorResponse, ProcessResponse};
use tugdts_graph::GraphKinds;

// ============================================================================
// CLI Structure
// ============================================================================

/// Post-processing for TypeScript declaration bundles.
#[derive(Parser, Debug)]
#[command(
    name = "tugdts",
    version,
    about = "Post-processing for TypeScript declaration bundles"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (default: tugdts.toml in the current directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the process command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Rendered declarations (default).
    #[default]
    Text,
    /// JSON envelope with file summaries and diagnostics.
    Json,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Parse declaration files, run processors, and print the result.
    Process {
        /// Declaration files or directories to walk for `*.d.ts`.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write the rendered bundle here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Remove declarations documented with this tag (repeatable).
        #[arg(long = "filter-tag", value_name = "TAG")]
        filter_tags: Vec<String>,

        /// Rewrite `@implements {import(...)}` tags into heritage and imports.
        #[arg(long)]
        implements_imports: bool,

        /// Copy ancestor parameter types into `@inheritDoc` members.
        #[arg(long)]
        inherit_doc: bool,

        /// Also write the inheritance graph of the result as JSON.
        #[arg(long, value_name = "FILE")]
        graph_json: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the inheritance graph of declaration files as JSON.
    Graph {
        /// Declaration files or directories to walk for `*.d.ts`.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Declaration kind to include as a vertex (repeatable, overrides config).
        #[arg(long = "kind", value_name = "KIND")]
        kinds: Vec<String>,
    },
}

impl Command {
    fn format(&self) -> OutputFormat {
        match self {
            Command::Process { format, .. } => *format,
            Command::Graph { .. } => OutputFormat::Json,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    let format = cli.command.format();
    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            report_error(&err, format);
            ExitCode::from(OutputErrorCode::from(&err).code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Report a failed run.
///
/// JSON runs get an error envelope on stdout. Text runs get the message,
/// or the annotated source snippet for parse errors, on stderr.
fn report_error(err: &DtsError, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let response = ErrorResponse::from_error(err);
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
        }
        OutputFormat::Text => match err {
            DtsError::Parse {
                snippet: Some(snippet),
                ..
            } => eprintln!("{}", snippet),
            _ => eprintln!("error: {}", err),
        },
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<ExitCode, DtsError> {
    let cwd = env::current_dir().map_err(|e| DtsError::io(".", e))?;
    let config = Config::resolve(cli.global.config.as_deref(), &cwd)?;

    match cli.command {
        Command::Process {
            inputs,
            out,
            filter_tags,
            implements_imports,
            inherit_doc,
            graph_json,
            format,
        } => {
            let options = ProcessOptions::from_config(&config.tugdts)?.with_flags(
                &filter_tags,
                implements_imports,
                inherit_doc,
            );
            execute_process(
                &inputs,
                &options,
                out.as_deref(),
                graph_json.as_deref(),
                format,
            )
        }
        Command::Graph { inputs, kinds } => {
            let kinds = if kinds.is_empty() {
                config.tugdts.graph_kinds()?
            } else {
                let mut overridden = config.tugdts.clone();
                overridden.graph_kinds = kinds;
                overridden.graph_kinds()?
            };
            execute_graph(&inputs, &kinds)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// Command Executors
// ============================================================================

/// Execute process command.
///
/// An aborted pipeline writes nothing. In JSON format the envelope still
/// reports the diagnostics collected up to the failure.
fn execute_process(
    inputs: &[PathBuf],
    options: &ProcessOptions,
    out: Option<&Path>,
    graph_out: Option<&Path>,
    format: OutputFormat,
) -> Result<ExitCode, DtsError> {
    let files = collect_inputs(inputs)?;
    let tree = load_tree(&files)?;
    tracing::info!("parsed {} file(s)", tree.files.len());

    let logger = MemoryLogger::forwarding(TracingLogger);
    let outcome = process_tree(tree, options, &logger)?;

    if let Some(aborted) = outcome.aborted {
        return match format {
            OutputFormat::Json => {
                let response =
                    ProcessResponse::new(file_summaries(&outcome.tree), logger.records())
                        .with_abort(AbortInfo::from(&aborted));
                write_json(&response)?;
                Ok(ExitCode::from(OutputErrorCode::ProcessingAborted.code()))
            }
            OutputFormat::Text => Err(aborted.into()),
        };
    }

    let rendered = render_tree(&outcome.tree);

    if let Some(path) = graph_out {
        let graph = graph_json(&outcome.tree, &options.kinds);
        let json = serde_json::to_string_pretty(&graph)
            .map_err(|e| DtsError::internal(e.to_string()))?;
        fs::write(path, json + "\n").map_err(|e| DtsError::io(path.display(), e))?;
        tracing::info!("wrote inheritance graph to {}", path.display());
    }

    if let Some(path) = out {
        fs::write(path, &rendered).map_err(|e| DtsError::io(path.display(), e))?;
        tracing::info!("wrote {}", path.display());
    }

    match format {
        OutputFormat::Text => {
            if out.is_none() {
                let mut stdout = io::stdout();
                stdout
                    .write_all(rendered.as_bytes())
                    .and_then(|_| stdout.flush())
                    .map_err(|e| DtsError::internal(e.to_string()))?;
            }
        }
        OutputFormat::Json => {
            let response = ProcessResponse::new(file_summaries(&outcome.tree), logger.records());
            let response = match out {
                Some(path) => response.with_output_path(path.display().to_string()),
                None => response.with_output(rendered),
            };
            write_json(&response)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Execute graph command.
fn execute_graph(inputs: &[PathBuf], kinds: &GraphKinds) -> Result<(), DtsError> {
    let files = collect_inputs(inputs)?;
    let tree = load_tree(&files)?;
    write_json(&graph_json(&tree, kinds))
}

fn write_json<T: serde::Serialize>(response: &T) -> Result<(), DtsError> {
    emit_response(response, &mut io::stdout()).map_err(|e| DtsError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
