// typegate-emit/src/lib.rs
// ============================================================================
// Module: Typegate Emitter Library
// Description: Deterministic schema JSON and validator-module generation.
// Purpose: Render, write, and drift-check the generated validator surface.
// Dependencies: typegate-core, thiserror
// ============================================================================

//! ## Overview
//! The emitter renders two artifacts from a schema: the canonical schema
//! JSON and a Rust module that embeds that JSON, parses it once, and exports
//! one `assert_*` entry point per asserted type plus one per referenced
//! built-in string format. Rendering is pure and deterministic: the same
//! schema always produces the same bytes, so `check` can detect drift by
//! byte comparison alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use thiserror::Error;
use typegate_core::Schema;
use typegate_core::SchemaError;
use typegate_core::StringFormat;
use typegate_core::TypeKind;
use typegate_core::TypeNode;
use typegate_core::runtime::formats::ALL_FORMATS;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while emitting validator artifacts.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Reading or writing an artifact failed.
    #[error("io error at {path}: {message}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying IO message.
        message: String,
    },
    /// Rendering the schema to canonical JSON failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// An on-disk artifact does not match the rendered content.
    #[error("{path} is out of date; re-run generation")]
    Drift {
        /// Offending path.
        path: String,
    },
}

// ============================================================================
// SECTION: Rendered Artifacts
// ============================================================================

/// The two deterministic artifacts rendered from one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Canonical schema JSON.
    pub schema_json: String,
    /// Generated validator module source.
    pub module_source: String,
}

// ============================================================================
// SECTION: Validator Emitter
// ============================================================================

/// Renders and verifies the generated validator surface for one schema.
#[derive(Debug, Clone)]
pub struct ValidatorEmitter {
    /// Schema the artifacts are rendered from.
    schema: Schema,
}

impl ValidatorEmitter {
    /// Creates an emitter for the given schema.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
        }
    }

    /// Renders both artifacts without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Schema`] when the schema cannot be serialized.
    pub fn render(&self) -> Result<Artifacts, EmitError> {
        let schema_json = self.schema.to_canonical_json()?;
        let module_source = render_module(&self.schema, &schema_json);
        Ok(Artifacts {
            schema_json,
            module_source,
        })
    }

    /// Writes both artifacts, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError`] when rendering or writing fails.
    pub fn write(&self, schema_out: &Path, module_out: &Path) -> Result<(), EmitError> {
        let artifacts = self.render()?;
        write_artifact(schema_out, &artifacts.schema_json)?;
        write_artifact(module_out, &artifacts.module_source)?;
        Ok(())
    }

    /// Verifies that the on-disk artifacts match the rendered content.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Drift`] when a file is missing or differs.
    pub fn check(&self, schema_out: &Path, module_out: &Path) -> Result<(), EmitError> {
        let artifacts = self.render()?;
        check_artifact(schema_out, &artifacts.schema_json)?;
        check_artifact(module_out, &artifacts.module_source)?;
        Ok(())
    }
}

fn write_artifact(path: &Path, content: &str) -> Result<(), EmitError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| EmitError::Io {
                path: parent.display().to_string(),
                message: err.to_string(),
            })?;
        }
    }
    fs::write(path, content).map_err(|err| EmitError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

fn check_artifact(path: &Path, expected: &str) -> Result<(), EmitError> {
    let Ok(actual) = fs::read_to_string(path) else {
        return Err(EmitError::Drift {
            path: path.display().to_string(),
        });
    };
    if actual == expected {
        Ok(())
    } else {
        Err(EmitError::Drift {
            path: path.display().to_string(),
        })
    }
}

// ============================================================================
// SECTION: Module Rendering
// ============================================================================

/// Renders the validator module embedding the canonical schema JSON.
fn render_module(schema: &Schema, schema_json: &str) -> String {
    let hashes = raw_string_hashes(schema_json);
    let mut out = String::new();
    out.push_str("// Generated by typegate. Do not edit by hand.\n\n");
    out.push_str("use std::sync::OnceLock;\n\n");
    out.push_str("use serde_json::Value;\n");
    out.push_str("use typegate_core::ConformanceError;\n");
    out.push_str("use typegate_core::Schema;\n");
    out.push_str("use typegate_core::StringFormat;\n");
    out.push_str("use typegate_core::TypeKind;\n");
    out.push_str("use typegate_core::TypeNode;\n");
    out.push_str("use typegate_core::check_value_against_type;\n\n");

    out.push_str("/// Canonical schema backing the generated validators.\n");
    out.push_str(&format!("pub const SCHEMA_JSON: &str = r{hashes}\"{schema_json}\"{hashes};\n\n"));

    out.push_str(
        "fn schema() -> &'static Schema {\n\
         \x20   static SCHEMA: OnceLock<Schema> = OnceLock::new();\n\
         \x20   SCHEMA.get_or_init(|| {\n\
         \x20       Schema::from_json_str(SCHEMA_JSON).expect(\"embedded schema is canonical\")\n\
         \x20   })\n\
         }\n\n",
    );
    out.push_str(
        "fn assert_named_type(value: &Value, name: &str) -> Result<(), ConformanceError> {\n\
         \x20   let schema = schema();\n\
         \x20   let node = schema.lookup(name).expect(\"embedded schema defines the type\");\n\
         \x20   let message = check_value_against_type(value, node, schema)\n\
         \x20       .expect(\"embedded schema is well formed\");\n\
         \x20   if message.is_empty() { Ok(()) } else { Err(ConformanceError(message)) }\n\
         }\n\n",
    );
    out.push_str(
        "fn assert_string_format(value: &Value, format: StringFormat) -> Result<(), ConformanceError> {\n\
         \x20   let node = TypeNode::named(\n\
         \x20       format.as_str(),\n\
         \x20       TypeKind::String { special_name: Some(format) },\n\
         \x20   );\n\
         \x20   let message = check_value_against_type(value, &node, schema())\n\
         \x20       .expect(\"string format checks are schema-independent\");\n\
         \x20   if message.is_empty() { Ok(()) } else { Err(ConformanceError(message)) }\n\
         }\n",
    );

    for name in &schema.asserted_types {
        out.push_str(&format!(
            "\n/// Asserts that a value conforms to `{name}`.\n\
             pub fn assert_{}(value: &Value) -> Result<(), ConformanceError> {{\n\
             \x20   assert_named_type(value, \"{name}\")\n\
             }}\n",
            snake_case(name)
        ));
    }

    for format in referenced_formats(schema) {
        let name = format.as_str();
        // A branded declaration of the same name already has an entry point.
        if schema.asserted_types.iter().any(|asserted| asserted == name) {
            continue;
        }
        out.push_str(&format!(
            "\n/// Asserts that a value is a valid `{name}` string.\n\
             pub fn assert_{}(value: &Value) -> Result<(), ConformanceError> {{\n\
             \x20   assert_string_format(value, StringFormat::{name})\n\
             }}\n",
            snake_case(name)
        ));
    }

    out
}

/// Returns the built-in formats the schema references, in canonical order.
fn referenced_formats(schema: &Schema) -> Vec<StringFormat> {
    let mut used = Vec::new();
    for node in schema.types.values() {
        collect_formats(node, &mut used);
    }
    ALL_FORMATS.iter().copied().filter(|format| used.contains(format)).collect()
}

fn collect_formats(node: &TypeNode, used: &mut Vec<StringFormat>) {
    match &node.kind {
        TypeKind::String { special_name } => {
            if let Some(format) = special_name {
                if !used.contains(format) {
                    used.push(*format);
                }
            }
        }
        TypeKind::Array { element_type } | TypeKind::Partial { element_type } => {
            collect_formats(element_type, used);
        }
        TypeKind::Interface { fields, heritage } => {
            for field in fields {
                collect_formats(&field.field_type, used);
            }
            for base in heritage {
                collect_formats(base, used);
            }
        }
        TypeKind::Union { union_members, .. } => {
            for member in union_members {
                collect_formats(member, used);
            }
        }
        TypeKind::Intersection { intersection_members } => {
            for member in intersection_members {
                collect_formats(member, used);
            }
        }
        TypeKind::Mapped { map_from, map_to, .. } => {
            collect_formats(map_from, used);
            collect_formats(map_to, used);
        }
        TypeKind::IndexSignature { key_type, value_type } => {
            collect_formats(key_type, used);
            collect_formats(value_type, used);
        }
        TypeKind::Omit { base, .. } | TypeKind::KeyOf { base } => collect_formats(base, used),
        TypeKind::Number
        | TypeKind::Boolean
        | TypeKind::Null
        | TypeKind::Undefined
        | TypeKind::Unknown
        | TypeKind::StringLiteral { .. }
        | TypeKind::NumberLiteral { .. }
        | TypeKind::BooleanLiteral { .. }
        | TypeKind::Reference { .. } => {}
    }
}

/// Picks a raw-string hash run that cannot collide with the embedded JSON.
fn raw_string_hashes(text: &str) -> String {
    let mut longest = 0usize;
    let bytes = text.as_bytes();
    let mut index = 0usize;
    while index < bytes.len() {
        if bytes[index] == b'"' {
            let mut run = 0usize;
            while index + 1 + run < bytes.len() && bytes[index + 1 + run] == b'#' {
                run += 1;
            }
            longest = longest.max(run);
            index += run + 1;
        } else {
            index += 1;
        }
    }
    "#".repeat(longest + 1)
}

/// Converts a declared type name to a snake_case entry-point suffix.
fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::new();
    for (index, ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let after_lower =
                index > 0 && (chars[index - 1].is_lowercase() || chars[index - 1].is_ascii_digit());
            let before_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
            if index > 0 && (after_lower || before_lower) {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(*ch);
        }
    }
    out
}
