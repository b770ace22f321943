// typegate-cli/src/main.rs
// ============================================================================
// Module: Typegate CLI
// Description: CLI entrypoint for schema extraction and validator emission.
// Purpose: Drive generate, check, and validate flows from the command line.
// Dependencies: clap, typegate-core, typegate-emit, typegate-extract
// ============================================================================

//! ## Overview
//! The `typegate` binary extracts annotated declarations into a schema and
//! emits the validator artifacts (`generate`), verifies that the on-disk
//! artifacts are current (`check`), and checks a JSON value against a named
//! type in a persisted schema (`validate`). All failures report on stderr
//! and exit non-zero; `validate` prints the conformance diagnostic on
//! stdout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use serde_json::Value;
use thiserror::Error;
use typegate_core::Schema;
use typegate_core::SchemaError;
use typegate_core::check_value_against_type;
use typegate_emit::EmitError;
use typegate_emit::ValidatorEmitter;
use typegate_extract::ExtractError;
use typegate_extract::extract_files;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// CLI arguments for Typegate.
#[derive(Debug, Parser)]
#[command(name = "typegate", about = "Generate and run validators for declared types.")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Supported CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Extract annotated declarations and write validator artifacts.
    Generate {
        /// Annotated declaration file; repeatable.
        #[arg(long, value_name = "FILE", required = true)]
        input: Vec<PathBuf>,
        /// Schema JSON output file.
        #[arg(long, value_name = "FILE", default_value = "generated/schema.json")]
        schema_out: PathBuf,
        /// Validator module output file.
        #[arg(long, value_name = "FILE", default_value = "generated/validators.rs")]
        module_out: PathBuf,
    },
    /// Verify that validator artifacts match the annotated declarations.
    Check {
        /// Annotated declaration file; repeatable.
        #[arg(long, value_name = "FILE", required = true)]
        input: Vec<PathBuf>,
        /// Schema JSON output file.
        #[arg(long, value_name = "FILE", default_value = "generated/schema.json")]
        schema_out: PathBuf,
        /// Validator module output file.
        #[arg(long, value_name = "FILE", default_value = "generated/validators.rs")]
        module_out: PathBuf,
    },
    /// Check a JSON value against a named type in a persisted schema.
    Validate {
        /// Persisted schema JSON file.
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,
        /// Name of the type to check against.
        #[arg(long, value_name = "NAME")]
        type_name: String,
        /// JSON file holding the value to check.
        #[arg(long, value_name = "FILE")]
        value: PathBuf,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
enum CliError {
    /// Extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// Emission or drift checking failed.
    #[error(transparent)]
    Emit(#[from] EmitError),
    /// Schema loading or checking failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Reading an input file failed.
    #[error("failed to read {path}: {message}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying IO message.
        message: String,
    },
    /// The value file does not hold JSON.
    #[error("value in {path} is not valid JSON: {message}")]
    MalformedValue {
        /// Offending path.
        path: String,
        /// Underlying parse message.
        message: String,
    },
}

// ============================================================================
// SECTION: Command Dispatch
// ============================================================================

/// CLI entrypoint.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => report_error(&err),
    }
}

/// Dispatches the CLI command.
fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate { input, schema_out, module_out } => {
            let schema = extract_files(&input)?;
            ValidatorEmitter::new(schema).write(&schema_out, &module_out)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { input, schema_out, module_out } => {
            let schema = extract_files(&input)?;
            ValidatorEmitter::new(schema).check(&schema_out, &module_out)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { schema, type_name, value } => {
            let schema = load_schema(&schema)?;
            let node = schema.lookup(&type_name)?;
            let checked = read_json_value(&value)?;
            let message = check_value_against_type(&checked, node, &schema)?;
            if message.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{message}");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn load_schema(path: &PathBuf) -> Result<Schema, CliError> {
    let raw = fs::read_to_string(path).map_err(|err| CliError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok(Schema::from_json_str(&raw)?)
}

fn read_json_value(path: &PathBuf) -> Result<Value, CliError> {
    let raw = fs::read_to_string(path).map_err(|err| CliError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|err| CliError::MalformedValue {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Reports an error on stderr and maps it to a failing exit code.
fn report_error(err: &CliError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}
