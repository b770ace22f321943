// typegate-core/src/schema/display.rs
// ============================================================================
// Module: Typegate Type Printing
// Description: Human-readable rendering of type nodes.
// Purpose: Produce source-like forms for diagnostics and snapshots.
// Dependencies: crate::schema::node
// ============================================================================

//! ## Overview
//! Diagnostics print types in a form close to the source syntax. A declared
//! `name` always wins over the structural form. The short form renders
//! interfaces on one line with `; ` separators; the long form uses newline
//! indentation via [`indent`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::schema::node::TypeKind;
use crate::schema::node::TypeNode;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Prefixes two spaces after every newline in `text`.
#[must_use]
pub fn indent(text: &str) -> String {
    text.replace('\n', "\n  ")
}

/// Renders a node in a form close to the source syntax.
///
/// When `name` is set on the node it is printed instead of the structural
/// form. `short` renders interfaces on one line.
#[must_use]
pub fn type_to_string(node: &TypeNode, short: bool) -> String {
    if let Some(name) = &node.name {
        return name.clone();
    }
    render_kind(&node.kind, short)
}

/// Renders the structural form of a kind.
fn render_kind(kind: &TypeKind, short: bool) -> String {
    match kind {
        TypeKind::String { special_name } => match special_name {
            Some(format) => format.as_str().to_string(),
            None => "string".to_string(),
        },
        TypeKind::Number => "number".to_string(),
        TypeKind::Boolean => "boolean".to_string(),
        TypeKind::Null => "null".to_string(),
        TypeKind::Undefined => "undefined".to_string(),
        TypeKind::Unknown => "unknown".to_string(),
        TypeKind::StringLiteral { value } => format!("'{value}'"),
        TypeKind::NumberLiteral { value } => format_number(*value),
        TypeKind::BooleanLiteral { value } => value.to_string(),
        TypeKind::Array { element_type } => {
            format!("Array<{}>", type_to_string(element_type, short))
        }
        TypeKind::Interface { fields, .. } => {
            if fields.is_empty() {
                return "{}".to_string();
            }
            let rendered: Vec<String> = fields
                .iter()
                .map(|field| {
                    let marker = if field.optional { "?" } else { "" };
                    format!("{}{marker}: {}", field.name, type_to_string(&field.field_type, short))
                })
                .collect();
            if short {
                format!("{{ {} }}", rendered.join("; "))
            } else {
                let body: Vec<String> = rendered.iter().map(|entry| indent(entry)).collect();
                format!("{{\n  {};\n}}", body.join(";\n  "))
            }
        }
        TypeKind::Union { union_members, .. } => {
            let rendered: Vec<String> =
                union_members.iter().map(|member| type_to_string(member, short)).collect();
            rendered.join(" | ")
        }
        TypeKind::Intersection { intersection_members } => {
            let rendered: Vec<String> =
                intersection_members.iter().map(|member| type_to_string(member, short)).collect();
            rendered.join(" & ")
        }
        TypeKind::Mapped { map_from, map_to, optional } => {
            let marker = if *optional { "?" } else { "" };
            format!(
                "{{ [key in {}]{marker}: {} }}",
                type_to_string(map_from, short),
                type_to_string(map_to, short)
            )
        }
        TypeKind::IndexSignature { key_type, value_type } => {
            format!(
                "{{ [key: {}]: {} }}",
                type_to_string(key_type, short),
                type_to_string(value_type, short)
            )
        }
        TypeKind::Omit { base, omitted_fields } => {
            let fields: Vec<String> =
                omitted_fields.iter().map(|field| format!("'{field}'")).collect();
            format!("Omit<{}, {}>", type_to_string(base, short), fields.join(" | "))
        }
        TypeKind::KeyOf { base } => format!("keyof {}", type_to_string(base, short)),
        TypeKind::Partial { element_type } => {
            format!("Partial<{}>", type_to_string(element_type, short))
        }
        TypeKind::Reference { referenced_type_name } => referenced_type_name.clone(),
    }
}

/// Renders a JSON number without a trailing `.0` for integral values.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
