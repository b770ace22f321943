// typegate-core/src/runtime/checker.rs
// ============================================================================
// Module: Typegate Conformance Checker
// Description: Recursive value-against-type interpretation with diagnostics.
// Purpose: Decide conformance and compose context-carrying error messages.
// Dependencies: crate::{schema, runtime::formats}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The checker is a single recursive procedure over the closed algebra. Each
//! frame resolves its type, dispatches on kind, and wraps sub-check failures
//! with one `While checking …` context line. The outermost call composes the
//! diagnostic header plus the optional `value = …` and `_TYPE_ = …` trailers.
//!
//! Conformance failures travel as [`CheckError::Failure`] and surface as the
//! returned diagnostic string. Schema and caller bugs (undefined references,
//! non-finite property sets inside `keyof`, `Partial` over non-interfaces)
//! travel as [`CheckError::Schema`], pass through every frame untouched, and
//! escape the public entry point as `Err`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::runtime::formats::StringFormat;
use crate::schema::FieldSpec;
use crate::schema::Schema;
use crate::schema::SchemaError;
use crate::schema::TypeKind;
use crate::schema::TypeNode;
use crate::schema::display;
use crate::schema::properties;
use crate::schema::resolve;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Values whose textual form reaches this length move to a `value =` trailer.
const VALUE_INLINE_LIMIT: usize = 40;
/// Structural type forms beyond this length fall back to the type path.
const SHORT_TYPE_LIMIT: usize = 40;
/// Placeholder for the top-level type; triggers the `_TYPE_ =` trailer.
const TYPE_SENTINEL: &str = "_TYPE_";

// ============================================================================
// SECTION: Public Entry Point
// ============================================================================

/// Error thrown by generated `assert_*` entry points on non-conformance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConformanceError(pub String);

/// Checks a value against a type node.
///
/// Returns the empty string when the value conforms, or a multi-line
/// diagnostic describing where and why it does not.
///
/// # Errors
///
/// Returns [`SchemaError`] when the schema itself is malformed; conformance
/// failures are never errors at this level.
pub fn check_value_against_type(
    value: &Value,
    node: &TypeNode,
    schema: &Schema,
) -> Result<String, SchemaError> {
    match check(value, node, schema, "value", TYPE_SENTINEL, false, &[]) {
        Ok(()) => Ok(String::new()),
        Err(CheckError::Schema(error)) => Err(error),
        Err(CheckError::Failure(reason)) => {
            let mut message = format!(
                "{} does not conform to {}!\n\n{}",
                short_value_description(value, "value"),
                short_type_description(node, TYPE_SENTINEL),
                reason
            );
            if value_repr(value).len() >= VALUE_INLINE_LIMIT {
                let pretty = serde_json::to_string_pretty(value)
                    .map_err(|err| SchemaError::Serialization(err.to_string()))?;
                message.push_str(&format!("\nvalue = {pretty}"));
            }
            if message.contains(TYPE_SENTINEL) {
                let pretty = serde_json::to_string_pretty(node)
                    .map_err(|err| SchemaError::Serialization(err.to_string()))?;
                message.push_str(&format!("\n{TYPE_SENTINEL} = {pretty}"));
            }
            Ok(message)
        }
    }
}

// ============================================================================
// SECTION: Error Propagation
// ============================================================================

/// Internal result channel of a check frame.
#[derive(Debug)]
enum CheckError {
    /// The value does not conform; the payload is the accumulated message.
    Failure(String),
    /// The schema or caller is buggy; passes through frames untouched.
    Schema(SchemaError),
}

impl From<SchemaError> for CheckError {
    fn from(error: SchemaError) -> Self {
        Self::Schema(error)
    }
}

fn fail(message: String) -> Result<(), CheckError> {
    Err(CheckError::Failure(message))
}

/// Runs a sub-check and appends one context line to conformance failures.
#[allow(clippy::too_many_arguments, reason = "mirrors the descent protocol exactly")]
fn subcheck(
    value: &Value,
    node: &TypeNode,
    schema: &Schema,
    value_path: &str,
    type_path: &str,
    partial: bool,
    ignored: &[String],
) -> Result<(), CheckError> {
    match check(value, node, schema, value_path, type_path, partial, ignored) {
        Err(CheckError::Failure(message)) => Err(CheckError::Failure(format!(
            "{message}\nWhile checking {} against type {}",
            short_value_description(value, value_path),
            short_type_description(node, type_path)
        ))),
        other => other,
    }
}

// ============================================================================
// SECTION: Recursive Descent
// ============================================================================

/// One check frame: resolve, dispatch on kind, recurse.
#[allow(clippy::too_many_lines, reason = "single exhaustive dispatch over the closed algebra")]
#[allow(clippy::too_many_arguments, reason = "mirrors the descent protocol exactly")]
fn check(
    value: &Value,
    node: &TypeNode,
    schema: &Schema,
    value_path: &str,
    type_path: &str,
    partial: bool,
    ignored: &[String],
) -> Result<(), CheckError> {
    let resolved = resolve::resolve_type(schema, node)?;
    match &resolved.kind {
        TypeKind::Unknown => Ok(()),
        TypeKind::String { special_name } => check_string(value, *special_name),
        TypeKind::Number => {
            if value.is_number() {
                Ok(())
            } else {
                fail(js_type_mismatch("number", value))
            }
        }
        TypeKind::Boolean => {
            if value.is_boolean() {
                Ok(())
            } else {
                fail(js_type_mismatch("boolean", value))
            }
        }
        TypeKind::Null => {
            if value.is_null() {
                Ok(())
            } else {
                fail(format!("Expected null, but got {}", value_repr(value)))
            }
        }
        // JSON carries no undefined value; absence is handled by the
        // enclosing record frame, so a present value can never match.
        TypeKind::Undefined => {
            fail(format!("Expected undefined, but got {}", value_repr(value)))
        }
        TypeKind::StringLiteral { value: expected } => {
            let Value::String(actual) = value else {
                return fail(js_type_mismatch("string", value));
            };
            if actual == expected {
                Ok(())
            } else {
                fail(format!("Expected string literal '{expected}', but got '{actual}'"))
            }
        }
        TypeKind::NumberLiteral { value: expected } => {
            let Some(actual) = value.as_f64() else {
                return fail(js_type_mismatch("number", value));
            };
            if actual == *expected {
                Ok(())
            } else {
                fail(format!(
                    "Expected number literal {}, but got {}",
                    display::format_number(*expected),
                    display::format_number(actual)
                ))
            }
        }
        TypeKind::BooleanLiteral { value: expected } => {
            let Value::Bool(actual) = value else {
                return fail(js_type_mismatch("boolean", value));
            };
            if actual == expected {
                Ok(())
            } else {
                fail(format!("Expected boolean literal {expected}, but got {actual}"))
            }
        }
        TypeKind::Array { element_type } => {
            let Value::Array(items) = value else {
                return fail(format!("Expected an array, but got type {}", js_type_of(value)));
            };
            for (index, item) in items.iter().enumerate() {
                subcheck(
                    item,
                    element_type,
                    schema,
                    &format!("{value_path}[{index}]"),
                    "the array element type",
                    false,
                    &[],
                )?;
            }
            Ok(())
        }
        TypeKind::Interface { fields, heritage } => {
            check_interface(value, fields, heritage, schema, value_path, partial, ignored)
        }
        TypeKind::Intersection { intersection_members } => {
            for (index, member) in intersection_members.iter().enumerate() {
                subcheck(
                    value,
                    member,
                    schema,
                    value_path,
                    &format!("the {} intersection member", ordinal(index + 1)),
                    false,
                    ignored,
                )?;
            }
            Ok(())
        }
        TypeKind::Mapped { map_from, map_to, optional } => check_mapped(
            value, map_from, map_to, *optional, schema, value_path, partial, ignored,
        ),
        TypeKind::IndexSignature { value_type, .. } => {
            let Value::Object(entries) = value else {
                return fail(js_type_mismatch("object", value));
            };
            for (key, entry) in entries {
                if ignored.contains(key) {
                    continue;
                }
                subcheck(
                    entry,
                    value_type,
                    schema,
                    &format!("{value_path}['{key}']"),
                    "the index signature value type",
                    false,
                    &[],
                )?;
            }
            Ok(())
        }
        TypeKind::Omit { base, omitted_fields } => {
            let mut extended = ignored.to_vec();
            extended.extend(omitted_fields.iter().cloned());
            check(value, base, schema, value_path, type_path, partial, &extended)
        }
        TypeKind::KeyOf { base } => {
            let Value::String(actual) = value else {
                return fail(js_type_mismatch("string", value));
            };
            let property_names = properties::properties_of_type(schema, base)?;
            if property_names.iter().any(|name| name == actual) {
                Ok(())
            } else {
                fail(format!(
                    "Expected one of [{}], but got '{actual}'",
                    quote_list(&property_names)
                ))
            }
        }
        TypeKind::Partial { element_type } => {
            let element = resolve::resolve_type(schema, element_type)?;
            if !matches!(element.kind, TypeKind::Interface { .. }) {
                return Err(SchemaError::PartialOnNonInterface {
                    type_name: display::type_to_string(&element, true),
                }
                .into());
            }
            check(value, &element, schema, value_path, type_path, true, ignored)
        }
        TypeKind::Union { union_members, kinds } => check_union(
            value,
            &resolved,
            union_members,
            kinds.as_deref(),
            schema,
            value_path,
            ignored,
        ),
        // Unreachable after resolution.
        TypeKind::Reference { referenced_type_name } => Err(SchemaError::UndefinedReference {
            name: referenced_type_name.clone(),
        }
        .into()),
    }
}

/// Primitive string check plus the optional format sub-validation.
fn check_string(value: &Value, special_name: Option<StringFormat>) -> Result<(), CheckError> {
    let Value::String(actual) = value else {
        return fail(js_type_mismatch("string", value));
    };
    if let Some(format) = special_name {
        if let Err(reason) = format.validate(actual) {
            return fail(format!("'{actual}' is not a valid {format}: {reason}"));
        }
    }
    Ok(())
}

/// Interface frame: own fields, then heritage, excess properties allowed.
fn check_interface(
    value: &Value,
    fields: &[FieldSpec],
    heritage: &[TypeNode],
    schema: &Schema,
    value_path: &str,
    partial: bool,
    ignored: &[String],
) -> Result<(), CheckError> {
    let Value::Object(entries) = value else {
        return fail(js_type_mismatch("object", value));
    };
    for field in fields {
        if ignored.contains(&field.name) {
            continue;
        }
        match entries.get(&field.name) {
            Some(present) => {
                subcheck(
                    present,
                    &field.field_type,
                    schema,
                    &format!("{value_path}['{}']", field.name),
                    &format!("the declared type of '{}'", field.name),
                    false,
                    &[],
                )?;
            }
            None => {
                if !partial && !field.optional {
                    return fail(format!("Missing required field '{}'", field.name));
                }
            }
        }
    }
    for base in heritage {
        subcheck(value, base, schema, value_path, "the base type", partial, ignored)?;
    }
    Ok(())
}

/// Mapped frame: open descent over `string`, fixed key set otherwise.
#[allow(clippy::too_many_arguments, reason = "mirrors the descent protocol exactly")]
fn check_mapped(
    value: &Value,
    map_from: &TypeNode,
    map_to: &TypeNode,
    optional: bool,
    schema: &Schema,
    value_path: &str,
    partial: bool,
    ignored: &[String],
) -> Result<(), CheckError> {
    let Value::Object(entries) = value else {
        return fail(js_type_mismatch("object", value));
    };
    let source = resolve::resolve_type(schema, map_from)?;
    if matches!(source.kind, TypeKind::String { .. }) {
        for (key, entry) in entries {
            if ignored.contains(key) {
                continue;
            }
            subcheck(
                entry,
                map_to,
                schema,
                &format!("{value_path}['{key}']"),
                "the mapped value type",
                false,
                &[],
            )?;
        }
        return Ok(());
    }

    let Some(keys) = resolve::enum_values(schema, &source)? else {
        return Err(SchemaError::UnsupportedMapFrom {
            type_name: display::type_to_string(&source, true),
        }
        .into());
    };
    for key in &keys {
        if ignored.contains(key) {
            continue;
        }
        match entries.get(key) {
            Some(entry) => {
                subcheck(
                    entry,
                    map_to,
                    schema,
                    &format!("{value_path}['{key}']"),
                    "the mapped value type",
                    false,
                    &[],
                )?;
            }
            None => {
                if !optional && !partial {
                    return fail(format!("Missing required field '{key}'"));
                }
            }
        }
    }
    Ok(())
}

/// Union frame: enum fast path, discriminated fast path, generic fallback.
fn check_union(
    value: &Value,
    resolved: &TypeNode,
    members: &[TypeNode],
    kinds: Option<&[String]>,
    schema: &Schema,
    value_path: &str,
    ignored: &[String],
) -> Result<(), CheckError> {
    if let Some(literals) = resolve::enum_values(schema, resolved)? {
        let Value::String(actual) = value else {
            return fail(js_type_mismatch("string", value));
        };
        if literals.iter().any(|literal| literal == actual) {
            return Ok(());
        }
        return fail(format!("Expected one of {}, but got '{actual}'", quote_list(&literals)));
    }

    if let Some(kinds) = kinds {
        let Value::Object(entries) = value else {
            return fail(js_type_mismatch("object", value));
        };
        let Some(tag) = entries.get("kind") else {
            return fail("Missing discriminator field 'kind'".to_string());
        };
        let bad_discriminator = || {
            format!(
                "Expected the discriminator field 'kind' to be one of {}, but got {}",
                quote_list(kinds),
                value_repr(tag)
            )
        };
        let Value::String(tag_value) = tag else {
            return fail(bad_discriminator());
        };
        if !kinds.iter().any(|kind| kind == tag_value) {
            return fail(bad_discriminator());
        }
        for member in members {
            let discriminant = resolve::member_discriminant(&schema.types, member)?;
            if discriminant.as_deref() == Some(tag_value.as_str()) {
                return subcheck(
                    value,
                    member,
                    schema,
                    value_path,
                    "the matching union member",
                    false,
                    ignored,
                );
            }
        }
        // The cache promised a member for every listed discriminant.
        return Err(SchemaError::Malformed(format!(
            "no union member carries the discriminant '{tag_value}'"
        ))
        .into());
    }

    let mut attempts = Vec::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        let label = format!("the {} union member", ordinal(index + 1));
        match check(value, member, schema, value_path, &label, false, ignored) {
            Ok(()) => return Ok(()),
            Err(CheckError::Failure(message)) => attempts.push(message),
            Err(schema_error) => return Err(schema_error),
        }
    }
    let mut combined = String::from("No union member matches:");
    for (index, message) in attempts.iter().enumerate() {
        combined.push_str(&format!(
            "\n- tried {} union member, but got:\n  {}",
            ordinal(index + 1),
            display::indent(message)
        ));
    }
    fail(combined)
}

// ============================================================================
// SECTION: Description Helpers
// ============================================================================

/// Short value form: the path alone when the textual form is long, else the
/// path plus an inline `aka.` rendering.
fn short_value_description(value: &Value, value_path: &str) -> String {
    let repr = value_repr(value);
    if repr.len() >= VALUE_INLINE_LIMIT {
        value_path.to_string()
    } else {
        format!("{value_path} (aka. `{repr}`)")
    }
}

/// Short type form: declared name, else the short printed form, else the
/// caller's fallback placeholder when the printed form is too long.
fn short_type_description(node: &TypeNode, fallback: &str) -> String {
    if let Some(name) = &node.name {
        return name.clone();
    }
    let short = display::type_to_string(node, true);
    if short.len() > SHORT_TYPE_LIMIT && short.len() > fallback.len() {
        fallback.to_string()
    } else {
        short
    }
}

/// Textual form of a value: single-quoted strings, raw primitives, and
/// compact JSON for arrays and objects.
fn value_repr(value: &Value) -> String {
    match value {
        Value::String(text) => format!("'{text}'"),
        _ => value.to_string(),
    }
}

/// JavaScript-style runtime type name of a JSON value.
fn js_type_of(value: &Value) -> &'static str {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    }
}

fn js_type_mismatch(expected: &str, value: &Value) -> String {
    format!("Expected Javascript type {expected}, but got type {}", js_type_of(value))
}

/// Joins values as `'a', 'b', 'c'`.
fn quote_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|value| format!("'{value}'")).collect();
    quoted.join(", ")
}

/// English ordinal: 1st, 2nd, 3rd, 4th, … with 11–13 taking `th`.
fn ordinal(number: usize) -> String {
    let suffix = match (number % 10, number % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{number}{suffix}")
}
