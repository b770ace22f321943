// typegate-extract/tests/extractor.rs
// ============================================================================
// Module: Extractor Tests
// Description: Marker scoping, lowering rules, and rejection coverage.
// Purpose: Ensure annotated declarations lower into the expected algebra.
// Dependencies: typegate-extract, typegate-core
// ============================================================================

//! ## Overview
//! Each test feeds in-memory declaration sources through the extractor and
//! inspects the lowered schema or the typed rejection.

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

use typegate_core::Schema;
use typegate_core::StringFormat;
use typegate_core::TypeKind;
use typegate_core::TypeNode;
use typegate_extract::ExtractError;
use typegate_extract::extract_sources;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn extract(source: &str) -> Schema {
    extract_sources(&[("types.ts", source)]).expect("extraction succeeds")
}

fn extract_err(source: &str) -> ExtractError {
    extract_sources(&[("types.ts", source)]).expect_err("extraction is rejected")
}

fn node<'a>(schema: &'a Schema, name: &str) -> &'a TypeNode {
    schema.lookup(name).expect("type is defined")
}

// ============================================================================
// SECTION: Marker Scoping
// ============================================================================

/// A file marker opts every declaration in the file in.
#[test]
fn file_marker_opts_in_every_declaration() {
    let schema = extract(
        "// @typegate-file\n\
         interface Point { x: number; y: number; }\n\
         type Label = string;\n",
    );
    assert_eq!(schema.asserted_types, vec!["Label".to_string(), "Point".to_string()]);
    assert_eq!(node(&schema, "Point").filename.as_deref(), Some("types.ts"));
}

/// A declaration marker opts in only the next declaration.
#[test]
fn declaration_marker_opts_in_one_declaration() {
    let schema = extract(
        "// @typegate\n\
         interface Kept { a: number; }\n\
         interface Dropped { b: number; }\n",
    );
    assert_eq!(schema.asserted_types, vec!["Kept".to_string()]);
    assert!(schema.lookup("Dropped").is_err());
}

/// The ignore-changes marker is recorded on the lowered node.
#[test]
fn ignore_changes_marker_is_recorded() {
    let schema = extract(
        "// @typegate @typegate-ignore-changes\n\
         interface Tracked { a: number; }\n",
    );
    assert_eq!(node(&schema, "Tracked").ignore_changes, Some(true));
}

/// The ignore-changes marker alone is rejected.
#[test]
fn ignore_changes_without_marker_is_rejected() {
    let error = extract_err(
        "// @typegate-ignore-changes\n\
         interface Lone { a: number; }\n",
    );
    assert!(matches!(error, ExtractError::IgnoreChangesWithoutMarker { .. }));
}

// ============================================================================
// SECTION: Lowering Rules
// ============================================================================

/// Fields lower with their optionality and primitive kinds.
#[test]
fn interface_fields_lower_with_optionality() {
    let schema = extract(
        "// @typegate\n\
         interface Person { name: string; age?: number; alive: boolean; }\n",
    );
    let TypeKind::Interface { fields, heritage } = &node(&schema, "Person").kind else {
        panic!("expected an interface");
    };
    assert!(heritage.is_empty());
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].name, "name");
    assert!(!fields[0].optional);
    assert_eq!(fields[0].field_type.kind, TypeKind::String { special_name: None });
    assert_eq!(fields[1].name, "age");
    assert!(fields[1].optional);
    assert_eq!(fields[2].field_type.kind, TypeKind::Boolean);
}

/// Heritage clauses lower to references.
#[test]
fn heritage_lowers_to_references() {
    let schema = extract(
        "// @typegate-file\n\
         interface Base { id: string; }\n\
         interface Sub extends Base { extra: number; }\n",
    );
    let TypeKind::Interface { heritage, .. } = &node(&schema, "Sub").kind else {
        panic!("expected an interface");
    };
    assert_eq!(
        heritage,
        &vec![TypeNode::new(TypeKind::Reference {
            referenced_type_name: "Base".to_string()
        })]
    );
}

/// Both array syntaxes, parentheses, and `readonly` lower transparently.
#[test]
fn arrays_parens_and_readonly_lower_transparently() {
    let schema = extract(
        "// @typegate-file\n\
         type Longhand = Array<number>;\n\
         type Shorthand = number[];\n\
         interface Wrapped { readonly items: (number | string)[]; }\n",
    );
    let longhand = &node(&schema, "Longhand").kind;
    let shorthand = &node(&schema, "Shorthand").kind;
    let TypeKind::Array { element_type } = longhand else {
        panic!("expected an array");
    };
    assert_eq!(element_type.kind, TypeKind::Number);
    assert_eq!(longhand, shorthand);

    let TypeKind::Interface { fields, .. } = &node(&schema, "Wrapped").kind else {
        panic!("expected an interface");
    };
    let TypeKind::Array { element_type } = &fields[0].field_type.kind else {
        panic!("expected an array field");
    };
    assert!(matches!(element_type.kind, TypeKind::Union { .. }));
}

/// Union members are sorted by their printed form.
#[test]
fn union_members_are_sorted_by_printed_form() {
    let schema = extract(
        "// @typegate\n\
         type Direction = 'north' | 'east' | 'south' | 'west';\n",
    );
    let TypeKind::Union { union_members, .. } = &node(&schema, "Direction").kind else {
        panic!("expected a union");
    };
    let values: Vec<String> = union_members
        .iter()
        .map(|member| match &member.kind {
            TypeKind::StringLiteral { value } => value.clone(),
            other => panic!("expected a string literal, got {other:?}"),
        })
        .collect();
    assert_eq!(values, vec!["east", "north", "south", "west"]);
}

/// A union of discriminated interfaces gets the kinds cache.
#[test]
fn discriminated_union_gets_kinds_cache() {
    let schema = extract(
        "// @typegate-file\n\
         interface Circle { kind: 'circle'; radius: number; }\n\
         interface Square { kind: 'square'; side: number; }\n\
         type Shape = Circle | Square;\n",
    );
    let TypeKind::Union { kinds, .. } = &node(&schema, "Shape").kind else {
        panic!("expected a union");
    };
    assert_eq!(kinds.as_deref(), Some(["circle".to_string(), "square".to_string()].as_slice()));
}

/// `Record`, mapped syntax, and `Partial` lower to their kinds.
#[test]
fn record_mapped_and_partial_lower() {
    let schema = extract(
        "// @typegate-file\n\
         type Scores = Record<string, number>;\n\
         type Flags = { [key in 'a' | 'b']?: boolean };\n\
         interface Point { x: number; y: number; }\n\
         type Loose = Partial<Point>;\n",
    );
    let TypeKind::Mapped { map_from, optional, .. } = &node(&schema, "Scores").kind else {
        panic!("expected a mapped type");
    };
    assert_eq!(map_from.kind, TypeKind::String { special_name: None });
    assert!(!optional);

    let TypeKind::Mapped { optional, .. } = &node(&schema, "Flags").kind else {
        panic!("expected a mapped type");
    };
    assert!(optional);

    assert!(matches!(node(&schema, "Loose").kind, TypeKind::Partial { .. }));
}

/// An object holding only an index signature lowers to `index-signature`.
#[test]
fn index_signature_object_lowers() {
    let schema = extract(
        "// @typegate\n\
         interface Counters { [key: string]: number; }\n",
    );
    let TypeKind::IndexSignature { value_type, .. } = &node(&schema, "Counters").kind else {
        panic!("expected an index signature");
    };
    assert_eq!(value_type.kind, TypeKind::Number);
}

/// A branded string declaration named after a built-in format is special.
#[test]
fn branded_builtin_lowers_to_special_string() {
    let schema = extract(
        "// @typegate-file\n\
         type IsoDate = string & { _isoDateBrand: void };\n\
         type Nickname = string & { _nicknameBrand: void };\n",
    );
    assert_eq!(
        node(&schema, "IsoDate").kind,
        TypeKind::String { special_name: Some(StringFormat::IsoDate) }
    );
    assert_eq!(
        node(&schema, "Nickname").kind,
        TypeKind::String { special_name: None }
    );
}

/// `Omit` selectors reduce through literals, references, and `keyof`.
#[test]
fn omit_selectors_reduce_to_field_names() {
    let schema = extract(
        "// @typegate-file\n\
         interface Point { x: number; y: number; z: number; }\n\
         type Axis = 'x' | 'y';\n\
         type Keys = keyof Point;\n\
         type Flat = Omit<Point, 'z'>;\n\
         type Planar = Omit<Point, Axis>;\n\
         type Bare = Omit<Point, keyof Point>;\n\
         type Indirect = Omit<Point, Keys>;\n",
    );
    let omitted = |name: &str| -> Vec<String> {
        let TypeKind::Omit { omitted_fields, .. } = &node(&schema, name).kind else {
            panic!("expected an omit node for {name}");
        };
        omitted_fields.clone()
    };
    assert_eq!(omitted("Flat"), vec!["z".to_string()]);
    assert_eq!(omitted("Planar"), vec!["x".to_string(), "y".to_string()]);
    assert_eq!(omitted("Bare"), vec!["x".to_string(), "y".to_string(), "z".to_string()]);
    assert_eq!(omitted("Indirect"), vec!["x".to_string(), "y".to_string(), "z".to_string()]);
}

/// Indexed access resolves to the field's declared type, through heritage.
#[test]
fn indexed_access_resolves_field_types() {
    let schema = extract(
        "// @typegate-file\n\
         interface Base { tag: string; }\n\
         interface Point extends Base { x: number; }\n\
         type Direct = Point['x'];\n\
         type Inherited = Point['tag'];\n",
    );
    assert_eq!(node(&schema, "Direct").kind, TypeKind::Number);
    assert_eq!(
        node(&schema, "Inherited").kind,
        TypeKind::String { special_name: None }
    );
}

/// Literal alias bodies lower to literal kinds.
#[test]
fn literal_aliases_lower_to_literal_kinds() {
    let schema = extract(
        "// @typegate-file\n\
         type Yes = true;\n\
         type Three = 3;\n\
         type Tag = 'tag';\n",
    );
    assert_eq!(node(&schema, "Yes").kind, TypeKind::BooleanLiteral { value: true });
    assert_eq!(node(&schema, "Three").kind, TypeKind::NumberLiteral { value: 3.0 });
    assert_eq!(node(&schema, "Tag").kind, TypeKind::StringLiteral { value: "tag".to_string() });
}

// ============================================================================
// SECTION: Rejections
// ============================================================================

/// Generic parameters on declarations are rejected.
#[test]
fn generic_declarations_are_rejected() {
    let error = extract_err("// @typegate\ninterface Box<T> { value: T; }\n");
    assert!(matches!(error, ExtractError::GenericDeclaration { .. }));
}

/// Unrecognised type applications are rejected.
#[test]
fn unknown_generics_are_rejected() {
    let error = extract_err("// @typegate\ntype Bad = Set<string>;\n");
    let ExtractError::UnknownGeneric { name, .. } = error else {
        panic!("expected an unknown-generic rejection, got {error:?}");
    };
    assert_eq!(name, "Set");
}

/// Mapped types with extra members are rejected.
#[test]
fn mapped_types_with_members_are_rejected() {
    let error =
        extract_err("// @typegate\ntype Bad = { [key in 'a' | 'b']: number; extra: string };\n");
    assert!(matches!(error, ExtractError::MappedWithMembers { .. }));
}

/// Index signatures mixed with named fields are rejected.
#[test]
fn mixed_index_signatures_are_rejected() {
    let error = extract_err("// @typegate\ninterface Bad { a: number; [key: string]: number; }\n");
    assert!(matches!(error, ExtractError::MixedMembers { .. }));
}

/// Heritage on index-signature objects is rejected.
#[test]
fn index_signature_heritage_is_rejected() {
    let error =
        extract_err("// @typegate\ninterface Bad extends Base { [key: string]: number; }\n");
    assert!(matches!(error, ExtractError::IndexSignatureHeritage { .. }));
}

/// Duplicate type names across the input set are rejected.
#[test]
fn duplicate_type_names_are_rejected() {
    let error = extract_sources(&[
        ("a.ts", "// @typegate\ninterface Point { x: number; }\n"),
        ("b.ts", "// @typegate\ninterface Point { y: number; }\n"),
    ])
    .expect_err("duplicate names are rejected");
    let ExtractError::DuplicateType { name } = error else {
        panic!("expected a duplicate-type rejection, got {error:?}");
    };
    assert_eq!(name, "Point");
}

/// Omit selectors that are not enum-like are rejected.
#[test]
fn non_enum_omit_selectors_are_rejected() {
    let error = extract_err(
        "// @typegate-file\n\
         interface Point { x: number; }\n\
         type Bad = Omit<Point, number>;\n",
    );
    assert!(matches!(error, ExtractError::OmitSelectorNotEnum { .. }));
}

/// Syntax errors carry file and line context.
#[test]
fn syntax_errors_carry_location() {
    let error = extract_err("// @typegate\ninterface Broken {\n  name string;\n}\n");
    let ExtractError::Parse { file, line, .. } = error else {
        panic!("expected a parse rejection, got {error:?}");
    };
    assert_eq!(file, "types.ts");
    assert_eq!(line, 3);
}
