// typegate-extract/src/lib.rs
// ============================================================================
// Module: Typegate Extractor Library
// Description: Annotated declaration parsing and schema lowering.
// Purpose: Turn marked source declarations into a persisted-ready schema.
// Dependencies: typegate-core, thiserror
// ============================================================================

//! ## Overview
//! The extractor walks declaration files for annotation markers, parses the
//! marked declarations with a self-contained lexer and recursive-descent
//! parser, and lowers them into the core type algebra. Unmarked declarations
//! are parsed for structure but never lowered, so they cannot enter the
//! schema or affect its asserted names.
//!
//! Inputs are untrusted: files are size-limited, every rejection carries file
//! and line context, and nothing is written anywhere by this crate.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod lexer;
mod lower;
mod parser;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use thiserror::Error;
use typegate_core::Schema;
use typegate_core::SchemaError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of a single declaration file in bytes.
pub const MAX_SOURCE_FILE_SIZE: usize = 1024 * 1024;

/// File-level marker opting every declaration in the file in.
pub const FILE_MARKER: &str = "@typegate-file";
/// Per-declaration marker.
pub const DECLARATION_MARKER: &str = "@typegate";
/// Marker setting `ignoreChanges`; valid only alongside a declaration or
/// file marker.
pub const IGNORE_CHANGES_MARKER: &str = "@typegate-ignore-changes";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while extracting schemas from declaration files.
///
/// # Invariants
/// - Syntax-level rejections carry the offending file and line.
/// - Schema-level failures wrap the core error unchanged.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Reading a declaration file failed.
    #[error("failed to read {path}: {message}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying IO message.
        message: String,
    },
    /// A declaration file exceeds the size limit.
    #[error("{path} exceeds the source size limit ({actual} > {limit} bytes)")]
    SourceTooLarge {
        /// Offending path.
        path: String,
        /// Observed size in bytes.
        actual: usize,
        /// Maximum allowed bytes.
        limit: usize,
    },
    /// The token stream does not match the declaration grammar.
    #[error("{file}:{line}: {message}")]
    Parse {
        /// Offending file.
        file: String,
        /// 1-based line number.
        line: usize,
        /// Human-readable reason.
        message: String,
    },
    /// A declaration carries generic parameters.
    #[error("{file}:{line}: generic parameters are not supported on declarations")]
    GenericDeclaration {
        /// Offending file.
        file: String,
        /// 1-based line number.
        line: usize,
    },
    /// A type application is not one of the recognised built-ins.
    #[error("{file}:{line}: unsupported type arguments for '{name}'")]
    UnknownGeneric {
        /// Offending file.
        file: String,
        /// 1-based line number.
        line: usize,
        /// Applied name.
        name: String,
    },
    /// A mapped type carries members besides its key clause.
    #[error("{file}:{line}: mapped types must not carry additional members")]
    MappedWithMembers {
        /// Offending file.
        file: String,
        /// 1-based line number.
        line: usize,
    },
    /// An index-signature object carries a heritage clause.
    #[error("{file}:{line}: index-signature objects cannot extend other types")]
    IndexSignatureHeritage {
        /// Offending file.
        file: String,
        /// 1-based line number.
        line: usize,
    },
    /// An object mixes an index signature with named fields.
    #[error("{file}:{line}: index signatures cannot be mixed with named fields")]
    MixedMembers {
        /// Offending file.
        file: String,
        /// 1-based line number.
        line: usize,
    },
    /// An ignore-changes marker appears without a declaration marker.
    #[error("{file}:{line}: @typegate-ignore-changes requires @typegate")]
    IgnoreChangesWithoutMarker {
        /// Offending file.
        file: String,
        /// 1-based line number.
        line: usize,
    },
    /// Two extracted declarations share a name.
    #[error("duplicate type name '{name}'")]
    DuplicateType {
        /// Conflicting name.
        name: String,
    },
    /// An `Omit` selector does not reduce to string literals.
    #[error("Omit selector {selector} does not reduce to string literals")]
    OmitSelectorNotEnum {
        /// Printed form of the selector.
        selector: String,
    },
    /// An indexed access does not resolve to an interface field.
    #[error("indexed access {base}['{key}'] does not resolve to an interface field")]
    UnresolvedIndexedAccess {
        /// Printed form of the base type.
        base: String,
        /// Accessed key.
        key: String,
    },
    /// A schema-level invariant failed during lowering.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

// ============================================================================
// SECTION: Public Entry Points
// ============================================================================

/// Extracts a schema from declaration files on disk.
///
/// # Errors
///
/// Returns [`ExtractError`] on IO failures, size violations, syntax errors,
/// and rejected constructs.
pub fn extract_files<P: AsRef<Path>>(paths: &[P]) -> Result<Schema, ExtractError> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|err| ExtractError::Io {
            path: display.clone(),
            message: err.to_string(),
        })?;
        if raw.len() > MAX_SOURCE_FILE_SIZE {
            return Err(ExtractError::SourceTooLarge {
                path: display,
                actual: raw.len(),
                limit: MAX_SOURCE_FILE_SIZE,
            });
        }
        sources.push((display, raw));
    }
    let borrowed: Vec<(&str, &str)> =
        sources.iter().map(|(name, text)| (name.as_str(), text.as_str())).collect();
    extract_sources(&borrowed)
}

/// Extracts a schema from in-memory `(filename, source)` pairs.
///
/// # Errors
///
/// Returns [`ExtractError`] on syntax errors and rejected constructs.
pub fn extract_sources(sources: &[(&str, &str)]) -> Result<Schema, ExtractError> {
    let mut declarations = Vec::new();
    for (file, text) in sources {
        let tokens = lexer::tokenize(file, text)?;
        declarations.extend(parser::parse_declarations(file, &tokens)?);
    }
    lower::lower_declarations(declarations)
}
