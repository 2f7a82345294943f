// crates/groundplan-cli/src/main.rs
// ============================================================================
// Module: Groundplan CLI Entry Point
// Description: Command dispatcher for blueprint authoring workflows.
// Purpose: Validate, normalize, digest, and preview blueprint documents.
// Dependencies: clap, groundplan-authoring, groundplan-core, serde_json
// ============================================================================

//! ## Overview
//! The Groundplan CLI wraps the authoring pipeline for local use: semantic
//! validation with a full violation report, normalization to canonical JSON,
//! content digests, capability output previews against an in-memory
//! environment, and generated authoring documentation. Inputs are untrusted
//! and every command fails closed on the first structural error.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use groundplan_authoring::AuthoringFormat;
use groundplan_authoring::authoring_markdown;
use groundplan_authoring::detect_format;
use groundplan_authoring::normalize_blueprint;
use groundplan_authoring::parse_documents;
use groundplan_core::DigestAlgorithm;
use groundplan_core::InMemoryEnvironment;
use groundplan_core::capability_values;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Command Line Definition
// ============================================================================

/// Groundplan blueprint tooling.
#[derive(Debug, Parser)]
#[command(name = "groundplan", version, about = "Blueprint document tooling")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate every document in a blueprint input.
    Validate(ValidateCommand),
    /// Normalize a single blueprint to canonical JSON.
    Normalize(NormalizeCommand),
    /// Print the canonical content digest of a blueprint.
    Digest(DigestCommand),
    /// Preview concrete capability outputs against an in-memory environment.
    Outputs(OutputsCommand),
    /// Print authoring-format documentation.
    Docs(DocsCommand),
}

/// Authoring format selection argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Canonical YAML authoring format.
    Yaml,
    /// JSON interchange format.
    Json,
}

impl From<FormatArg> for AuthoringFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Yaml => Self::Yaml,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Report rendering selection argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportArg {
    /// Human-readable text report.
    Text,
    /// Canonical JSON report.
    Json,
}

/// Arguments for the `validate` command.
#[derive(Debug, Args)]
struct ValidateCommand {
    /// Blueprint input path.
    #[arg(long)]
    input: PathBuf,
    /// Authoring format override (defaults to the file extension).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Report rendering.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportArg,
}

/// Arguments for the `normalize` command.
#[derive(Debug, Args)]
struct NormalizeCommand {
    /// Blueprint input path.
    #[arg(long)]
    input: PathBuf,
    /// Authoring format override (defaults to the file extension).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Output path for canonical JSON (defaults to stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Arguments for the `digest` command.
#[derive(Debug, Args)]
struct DigestCommand {
    /// Blueprint input path.
    #[arg(long)]
    input: PathBuf,
    /// Authoring format override (defaults to the file extension).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

/// Arguments for the `outputs` command.
#[derive(Debug, Args)]
struct OutputsCommand {
    /// Blueprint input path.
    #[arg(long)]
    input: PathBuf,
    /// Authoring format override (defaults to the file extension).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Input override as `name=value`; values parse as JSON with a plain
    /// string fallback.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    sets: Vec<String>,
    /// Secret value as `name=value`; values parse as JSON with a plain
    /// string fallback.
    #[arg(long = "secret", value_name = "NAME=VALUE")]
    secrets: Vec<String>,
    /// Path to a JSON file mapping node names to attribute documents.
    #[arg(long)]
    attributes: Option<PathBuf>,
}

/// Arguments for the `docs` command.
#[derive(Debug, Args)]
struct DocsCommand {
    /// Output path for the markdown (defaults to stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

// ============================================================================
// SECTION: Validation Report Rendering
// ============================================================================

/// Validation outcome for one document in a stream.
#[derive(Debug, Serialize)]
struct DocumentReport {
    /// Zero-based position in the stream.
    index: usize,
    /// Whether the document satisfied every invariant.
    valid: bool,
    /// Rendered violation messages in detection order.
    violations: Vec<String>,
}

/// Validation outcome for a whole input.
#[derive(Debug, Serialize)]
struct ValidateReport {
    /// Per-document outcomes in stream order.
    documents: Vec<DocumentReport>,
}

impl ValidateReport {
    /// Returns whether every document in the input validated.
    fn all_valid(&self) -> bool {
        self.documents.iter().all(|document| document.valid)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a human-readable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Normalize(command) => command_normalize(&command),
        Commands::Digest(command) => command_digest(&command),
        Commands::Outputs(command) => command_outputs(&command),
        Commands::Docs(command) => command_docs(&command),
    }
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let format = resolve_format(command.format, &command.input);
    let input = read_input(&command.input)?;
    let report = validate_input(&input, format)?;
    match command.report {
        ReportArg::Text => render_validate_text(&report)?,
        ReportArg::Json => write_json_value(
            &serde_json::to_value(&report)
                .map_err(|err| CliError::new(format!("failed to serialize report: {err}")))?,
        )?,
    }
    if report.all_valid() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Validates every document in an input and builds the report.
fn validate_input(input: &str, format: AuthoringFormat) -> CliResult<ValidateReport> {
    let blueprints =
        parse_documents(input, format).map_err(|err| CliError::new(err.to_string()))?;
    let documents = blueprints
        .iter()
        .enumerate()
        .map(|(index, blueprint)| {
            let outcome = blueprint.validate();
            DocumentReport {
                index,
                valid: outcome.is_valid(),
                violations: outcome
                    .violations()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            }
        })
        .collect();
    Ok(ValidateReport {
        documents,
    })
}

/// Renders a validation report as human-readable text.
fn render_validate_text(report: &ValidateReport) -> CliResult<()> {
    for document in &report.documents {
        if document.valid {
            write_stdout_line(&format!("document {}: valid", document.index))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            continue;
        }
        write_stdout_line(&format!(
            "document {}: {} violation(s)",
            document.index,
            document.violations.len()
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        for violation in &document.violations {
            write_stdout_line(&format!("  - {violation}"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Normalize Command
// ============================================================================

/// Executes the `normalize` command.
fn command_normalize(command: &NormalizeCommand) -> CliResult<ExitCode> {
    let format = resolve_format(command.format, &command.input);
    let input = read_input(&command.input)?;
    let normalized =
        normalize_blueprint(&input, format).map_err(|err| CliError::new(err.to_string()))?;
    let mut bytes = normalized.canonical_json;
    bytes.push(b'\n');
    match &command.output {
        Some(path) => fs::write(path, &bytes).map_err(|err| {
            CliError::new(format!("failed to write {}: {err}", path.display()))
        })?,
        None => write_stdout_bytes(&bytes)
            .map_err(|err| CliError::new(output_error("stdout", &err)))?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Digest Command
// ============================================================================

/// Executes the `digest` command.
fn command_digest(command: &DigestCommand) -> CliResult<ExitCode> {
    let format = resolve_format(command.format, &command.input);
    let input = read_input(&command.input)?;
    let normalized =
        normalize_blueprint(&input, format).map_err(|err| CliError::new(err.to_string()))?;
    let line = format!(
        "{}:{}",
        algorithm_label(normalized.digest.algorithm),
        normalized.digest.value
    );
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Returns the stable label for a digest algorithm.
const fn algorithm_label(algorithm: DigestAlgorithm) -> &'static str {
    match algorithm {
        DigestAlgorithm::Sha256 => "sha256",
    }
}

// ============================================================================
// SECTION: Outputs Command
// ============================================================================

/// Executes the `outputs` command.
fn command_outputs(command: &OutputsCommand) -> CliResult<ExitCode> {
    let format = resolve_format(command.format, &command.input);
    let input = read_input(&command.input)?;
    let attributes = match &command.attributes {
        Some(path) => Some(read_attributes(path)?),
        None => None,
    };
    let outputs = preview_outputs(&input, format, &command.sets, &command.secrets, attributes)?;
    write_json_value(&outputs)?;
    Ok(ExitCode::SUCCESS)
}

/// Resolves capability outputs for a single-document input.
fn preview_outputs(
    input: &str,
    format: AuthoringFormat,
    sets: &[String],
    secrets: &[String],
    attributes: Option<Value>,
) -> CliResult<Value> {
    let normalized =
        normalize_blueprint(input, format).map_err(|err| CliError::new(err.to_string()))?;
    let mut environment = InMemoryEnvironment::new();
    for raw in secrets {
        let (name, value) = parse_override(raw)?;
        environment = environment.with_secret(name, value);
    }
    for raw in sets {
        let (name, value) = parse_override(raw)?;
        environment = environment.with_input(name, value);
    }
    if let Some(attributes) = attributes {
        let Value::Object(entries) = attributes else {
            return Err(CliError::new(
                "attributes file must hold a JSON object keyed by node name".to_owned(),
            ));
        };
        for (node, document) in entries {
            environment = environment.with_node_attributes(node, document);
        }
    }
    environment
        .apply_input_defaults(&normalized.blueprint)
        .map_err(|err| CliError::new(err.to_string()))?;
    let outputs = capability_values(&normalized.blueprint, &environment)
        .map_err(|err| CliError::new(err.to_string()))?;
    let mut object = serde_json::Map::new();
    for (name, value) in outputs {
        object.insert(name.as_str().to_owned(), value);
    }
    Ok(Value::Object(object))
}

/// Reads and parses a node-attributes JSON file.
fn read_attributes(path: &Path) -> CliResult<Value> {
    let text = read_input(path)?;
    serde_json::from_str(&text)
        .map_err(|err| CliError::new(format!("failed to parse {}: {err}", path.display())))
}

/// Parses a `name=value` override; values parse as JSON with a plain string
/// fallback.
fn parse_override(raw: &str) -> CliResult<(String, Value)> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(CliError::new(format!("override must be name=value: {raw}")));
    };
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((name.to_owned(), value))
}

// ============================================================================
// SECTION: Docs Command
// ============================================================================

/// Executes the `docs` command.
fn command_docs(command: &DocsCommand) -> CliResult<ExitCode> {
    let markdown = authoring_markdown();
    match &command.output {
        Some(path) => fs::write(path, &markdown).map_err(|err| {
            CliError::new(format!("failed to write {}: {err}", path.display()))
        })?,
        None => write_stdout_bytes(markdown.as_bytes())
            .map_err(|err| CliError::new(output_error("stdout", &err)))?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Resolves the authoring format from a flag or the input extension.
fn resolve_format(flag: Option<FormatArg>, path: &Path) -> AuthoringFormat {
    flag.map_or_else(
        || detect_format(path).unwrap_or(AuthoringFormat::Yaml),
        AuthoringFormat::from,
    )
}

/// Reads an input file into a string.
fn read_input(path: &Path) -> CliResult<String> {
    fs::read_to_string(path)
        .map_err(|err| CliError::new(format!("failed to read {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a canonical JSON value to stdout.
fn write_json_value(value: &Value) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to serialize json: {err}")))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
