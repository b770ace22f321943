// typegate-core/tests/schema_model.rs
// ============================================================================
// Module: Schema Model Tests
// Description: Persistence, resolution, and printing of the type algebra.
// Purpose: Pin the wire format and the schema-level operations.
// Dependencies: typegate-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises the persisted JSON form (load, canonical emit, tolerance of
//! unknown keys), reference resolution with alias preservation, enum
//! detection, discriminant caching on load, and `type_to_string` rendering.

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

use typegate_core::FieldSpec;
use typegate_core::Schema;
use typegate_core::SchemaError;
use typegate_core::TypeKind;
use typegate_core::TypeNode;
use typegate_core::enum_values;
use typegate_core::indent;
use typegate_core::is_enum;
use typegate_core::resolve_type;
use typegate_core::type_to_string;

// ============================================================================
// SECTION: Persistence
// ============================================================================

const SAMPLE_SCHEMA: &str = r#"{
  "types": {
    "Age": { "kind": "number", "name": "Age" },
    "Person": {
      "kind": "interface",
      "fields": [
        { "name": "age", "optional": false, "type": { "kind": "reference-type", "referencedTypeName": "Age" } },
        { "name": "nickname", "optional": true, "type": { "kind": "string" } }
      ],
      "name": "Person"
    }
  },
  "assertedTypes": ["Person"]
}"#;

/// Loading and re-emitting a schema preserves its structure.
#[test]
fn schema_round_trips_through_canonical_json() {
    let schema = Schema::from_json_str(SAMPLE_SCHEMA).expect("well-formed schema");
    let rendered = schema.to_canonical_json().expect("serializable");
    let reloaded = Schema::from_json_str(&rendered).expect("canonical form loads");
    assert_eq!(schema, reloaded);
    assert_eq!(rendered, reloaded.to_canonical_json().expect("serializable"));
    assert!(rendered.ends_with('\n'));
}

/// Unknown keys on nodes are tolerated on load.
#[test]
fn unknown_node_keys_are_tolerated() {
    let raw = r#"{
      "types": {
        "Flag": { "kind": "boolean", "name": "Flag", "futureAnnotation": { "x": 1 } }
      },
      "assertedTypes": ["Flag"]
    }"#;
    let schema = Schema::from_json_str(raw).expect("unknown keys tolerated");
    let node = schema.lookup("Flag").expect("defined");
    assert_eq!(node.kind, TypeKind::Boolean);
}

/// Malformed JSON is reported as a schema error.
#[test]
fn malformed_json_is_rejected() {
    let error = Schema::from_json_str("{ not json").expect_err("malformed input");
    assert!(matches!(error, SchemaError::Malformed(_)));
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolution chases reference chains and keeps the last-seen alias.
#[test]
fn resolution_preserves_last_alias() {
    let mut schema = Schema::new();
    schema
        .types
        .insert("Id".to_string(), TypeNode::named("Id", TypeKind::String { special_name: None }));
    schema.types.insert("UserId".to_string(), {
        let mut node = TypeNode::reference("Id");
        node.name = Some("UserId".to_string());
        node
    });

    let resolved = resolve_type(&schema, &TypeNode::reference("UserId")).expect("defined");
    assert_eq!(resolved.kind, TypeKind::String { special_name: None });
    assert_eq!(resolved.name.as_deref(), Some("Id"));
}

/// A missing reference reports the missing name.
#[test]
fn missing_reference_is_reported() {
    let schema = Schema::new();
    let error = resolve_type(&schema, &TypeNode::reference("Ghost")).expect_err("missing");
    assert_eq!(error, SchemaError::UndefinedReference { name: "Ghost".to_string() });
}

/// Pure reference cycles are rejected rather than looping.
#[test]
fn reference_cycles_are_rejected() {
    let mut schema = Schema::new();
    schema.types.insert("A".to_string(), TypeNode::reference("B"));
    schema.types.insert("B".to_string(), TypeNode::reference("A"));
    let error = resolve_type(&schema, &TypeNode::reference("A")).expect_err("cycle");
    assert!(matches!(error, SchemaError::Malformed(_)));
}

// ============================================================================
// SECTION: Enum Detection and Discriminants
// ============================================================================

/// Singleton literals and literal unions are enum-like; others are not.
#[test]
fn enum_detection_covers_singletons_and_unions() {
    let schema = Schema::new();
    let single = TypeNode::new(TypeKind::StringLiteral { value: "only".to_string() });
    assert_eq!(
        enum_values(&schema, &single).expect("resolvable"),
        Some(vec!["only".to_string()])
    );

    let union = TypeNode::new(TypeKind::Union {
        union_members: vec![
            TypeNode::new(TypeKind::StringLiteral { value: "b".to_string() }),
            TypeNode::new(TypeKind::StringLiteral { value: "a".to_string() }),
        ],
        kinds: None,
    });
    assert_eq!(
        enum_values(&schema, &union).expect("resolvable"),
        Some(vec!["b".to_string(), "a".to_string()])
    );

    let mixed = TypeNode::new(TypeKind::Union {
        union_members: vec![
            TypeNode::new(TypeKind::StringLiteral { value: "a".to_string() }),
            TypeNode::new(TypeKind::Number),
        ],
        kinds: None,
    });
    assert!(!is_enum(&schema, &mixed).expect("resolvable"));
}

/// Loading a hand-written discriminated union attaches the kinds cache.
#[test]
fn loading_attaches_discriminant_cache() {
    let raw = r#"{
      "types": {
        "Event": {
          "kind": "union",
          "unionMembers": [
            {
              "kind": "interface",
              "fields": [{ "name": "kind", "optional": false, "type": { "kind": "string-literal", "value": "open" } }]
            },
            {
              "kind": "interface",
              "fields": [{ "name": "kind", "optional": false, "type": { "kind": "string-literal", "value": "close" } }]
            }
          ],
          "name": "Event"
        }
      },
      "assertedTypes": ["Event"]
    }"#;
    let schema = Schema::from_json_str(raw).expect("well-formed schema");
    let node = schema.lookup("Event").expect("defined");
    let TypeKind::Union { kinds, .. } = &node.kind else {
        panic!("expected a union node");
    };
    assert_eq!(kinds.as_deref(), Some(["open".to_string(), "close".to_string()].as_slice()));
}

/// Members without a shared non-optional kind literal stay uncached.
#[test]
fn unions_without_discriminants_stay_uncached() {
    let raw = r#"{
      "types": {
        "Loose": {
          "kind": "union",
          "unionMembers": [
            {
              "kind": "interface",
              "fields": [{ "name": "kind", "optional": true, "type": { "kind": "string-literal", "value": "open" } }]
            },
            { "kind": "string" }
          ],
          "name": "Loose"
        }
      },
      "assertedTypes": ["Loose"]
    }"#;
    let schema = Schema::from_json_str(raw).expect("well-formed schema");
    let node = schema.lookup("Loose").expect("defined");
    let TypeKind::Union { kinds, .. } = &node.kind else {
        panic!("expected a union node");
    };
    assert!(kinds.is_none());
}

// ============================================================================
// SECTION: Printing
// ============================================================================

/// Printed forms stay close to the source syntax.
#[test]
fn type_to_string_renders_source_like_forms() {
    let number = TypeNode::new(TypeKind::Number);
    let array = TypeNode::new(TypeKind::Array { element_type: Box::new(number.clone()) });
    assert_eq!(type_to_string(&array, true), "Array<number>");

    let union = TypeNode::new(TypeKind::Union {
        union_members: vec![TypeNode::reference("A"), TypeNode::reference("B")],
        kinds: None,
    });
    assert_eq!(type_to_string(&union, true), "A | B");

    let omit = TypeNode::new(TypeKind::Omit {
        base: Box::new(TypeNode::reference("T")),
        omitted_fields: vec!["x".to_string(), "y".to_string()],
    });
    assert_eq!(type_to_string(&omit, true), "Omit<T, 'x' | 'y'>");

    let keyof = TypeNode::new(TypeKind::KeyOf { base: Box::new(TypeNode::reference("T")) });
    assert_eq!(type_to_string(&keyof, true), "keyof T");

    let named = TypeNode::named("Alias", TypeKind::Number);
    assert_eq!(type_to_string(&named, true), "Alias");
}

/// Interfaces render on one line in short form and indented in long form.
#[test]
fn interface_rendering_respects_short_flag() {
    let node = TypeNode::new(TypeKind::Interface {
        fields: vec![
            FieldSpec::required("a", TypeNode::new(TypeKind::Number)),
            FieldSpec::optional("b", TypeNode::new(TypeKind::String { special_name: None })),
        ],
        heritage: Vec::new(),
    });
    assert_eq!(type_to_string(&node, true), "{ a: number; b?: string }");
    assert_eq!(type_to_string(&node, false), "{\n  a: number;\n  b?: string;\n}");
}

/// The indent utility prefixes two spaces after every newline.
#[test]
fn indent_prefixes_after_newlines() {
    assert_eq!(indent("a\nb\nc"), "a\n  b\n  c");
    assert_eq!(indent("flat"), "flat");
}
