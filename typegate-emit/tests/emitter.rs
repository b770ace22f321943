// typegate-emit/tests/emitter.rs
// ============================================================================
// Module: Emitter Tests
// Description: Determinism, drift detection, and generated-surface naming.
// Purpose: Ensure rendered artifacts are stable and verifiable.
// Dependencies: typegate-emit, typegate-core, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Renders schemas into artifacts and checks the generated entry points, the
//! byte-stability of rendering, and the write/check drift cycle on disk.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;

use typegate_core::FieldSpec;
use typegate_core::Schema;
use typegate_core::StringFormat;
use typegate_core::TypeKind;
use typegate_core::TypeNode;
use typegate_emit::EmitError;
use typegate_emit::ValidatorEmitter;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn sample_schema() -> Schema {
    let mut schema = Schema::new();
    schema.types.insert(
        "UserProfile".to_string(),
        TypeNode::named(
            "UserProfile",
            TypeKind::Interface {
                fields: vec![
                    FieldSpec::required(
                        "name",
                        TypeNode::new(TypeKind::String { special_name: None }),
                    ),
                    FieldSpec::optional(
                        "joined",
                        TypeNode::new(TypeKind::String {
                            special_name: Some(StringFormat::IsoDate),
                        }),
                    ),
                ],
                heritage: Vec::new(),
            },
        ),
    );
    schema.asserted_types = vec!["UserProfile".to_string()];
    schema
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Rendering is deterministic byte for byte.
#[test]
fn rendering_is_deterministic() {
    let emitter = ValidatorEmitter::new(sample_schema());
    let first = emitter.render().expect("renders");
    let second = emitter.render().expect("renders");
    assert_eq!(first, second);
}

/// The module embeds the canonical schema JSON and exports one assert per
/// asserted type and referenced format.
#[test]
fn module_exports_expected_entry_points() {
    let emitter = ValidatorEmitter::new(sample_schema());
    let artifacts = emitter.render().expect("renders");

    assert!(artifacts.module_source.contains("pub const SCHEMA_JSON: &str = r#\""));
    assert!(artifacts.module_source.contains(&artifacts.schema_json));
    assert!(
        artifacts
            .module_source
            .contains("pub fn assert_user_profile(value: &Value) -> Result<(), ConformanceError>")
    );
    assert!(
        artifacts
            .module_source
            .contains("pub fn assert_iso_date(value: &Value) -> Result<(), ConformanceError>")
    );
    assert!(artifacts.module_source.contains("StringFormat::IsoDate"));
}

/// A branded declaration sharing a format's name yields one entry point.
#[test]
fn branded_declaration_does_not_duplicate_format_assert() {
    let mut schema = Schema::new();
    schema.types.insert(
        "IsoDate".to_string(),
        TypeNode::named(
            "IsoDate",
            TypeKind::String {
                special_name: Some(StringFormat::IsoDate),
            },
        ),
    );
    schema.asserted_types = vec!["IsoDate".to_string()];

    let artifacts = ValidatorEmitter::new(schema).render().expect("renders");
    let occurrences = artifacts.module_source.matches("pub fn assert_iso_date(").count();
    assert_eq!(occurrences, 1);
}

/// Schema text that could close a raw string gets a longer hash fence.
#[test]
fn raw_string_fence_survives_hash_heavy_literals() {
    let mut schema = Schema::new();
    schema.types.insert(
        "Tricky".to_string(),
        TypeNode::named(
            "Tricky",
            TypeKind::StringLiteral {
                value: "\"#\"##".to_string(),
            },
        ),
    );
    schema.asserted_types = vec!["Tricky".to_string()];

    let artifacts = ValidatorEmitter::new(schema).render().expect("renders");
    assert!(artifacts.module_source.contains("r###\""));
    assert!(artifacts.module_source.contains(&artifacts.schema_json));
}

// ============================================================================
// SECTION: Write and Check
// ============================================================================

/// A freshly written pair of artifacts passes the drift check.
#[test]
fn write_then_check_is_clean() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let schema_out = temp.path().join("generated/schema.json");
    let module_out = temp.path().join("generated/validators.rs");

    let emitter = ValidatorEmitter::new(sample_schema());
    emitter.write(&schema_out, &module_out)?;
    emitter.check(&schema_out, &module_out)?;

    let written = fs::read_to_string(&schema_out)?;
    assert_eq!(written, emitter.render()?.schema_json);
    Ok(())
}

/// Edited artifacts fail the drift check.
#[test]
fn check_detects_edited_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let schema_out = temp.path().join("schema.json");
    let module_out = temp.path().join("validators.rs");

    let emitter = ValidatorEmitter::new(sample_schema());
    emitter.write(&schema_out, &module_out)?;

    let mut edited = fs::read_to_string(&schema_out)?;
    edited.push_str("\n// drifted");
    fs::write(&schema_out, edited)?;

    let Err(error) = emitter.check(&schema_out, &module_out) else {
        return Err("expected drift to be detected".into());
    };
    assert!(matches!(error, EmitError::Drift { .. }));
    Ok(())
}

/// Missing artifacts fail the drift check.
#[test]
fn check_detects_missing_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let schema_out = temp.path().join("schema.json");
    let module_out = temp.path().join("validators.rs");

    let emitter = ValidatorEmitter::new(sample_schema());
    emitter.write(&schema_out, &module_out)?;
    fs::remove_file(&module_out)?;

    let Err(error) = emitter.check(&schema_out, &module_out) else {
        return Err("expected the missing file to be detected".into());
    };
    assert!(matches!(error, EmitError::Drift { .. }));
    Ok(())
}
