// typegate-core/src/schema/properties.rs
// ============================================================================
// Module: Typegate Property Computation
// Description: Over-approximated property sets for type nodes.
// Purpose: Back `keyof` evaluation and Omit-aware descent.
// Dependencies: crate::schema::{display, node, resolve}
// ============================================================================

//! ## Overview
//! The property set of a type is the set of property names values of that
//! type may legally carry. It over-approximates: unions contribute every
//! member's properties. Open dictionaries have no finite set and fail with
//! [`SchemaError::OpenPropertySet`], which callers treat as a schema bug
//! rather than a conformance failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::schema::SchemaError;
use crate::schema::display;
use crate::schema::node::Schema;
use crate::schema::node::TypeKind;
use crate::schema::node::TypeNode;
use crate::schema::resolve;

// ============================================================================
// SECTION: Property Computation
// ============================================================================

/// Returns the property names values of this type may carry, deduplicated
/// preserving first occurrence.
///
/// # Errors
///
/// Returns [`SchemaError::OpenPropertySet`] for index signatures and mapped
/// types over unrestricted `string`, and resolution errors for undefined
/// references.
pub fn properties_of_type(schema: &Schema, node: &TypeNode) -> Result<Vec<String>, SchemaError> {
    let resolved = resolve::resolve_type(schema, node)?;
    match &resolved.kind {
        TypeKind::String { .. }
        | TypeKind::Number
        | TypeKind::Boolean
        | TypeKind::Null
        | TypeKind::Undefined
        | TypeKind::Unknown
        | TypeKind::StringLiteral { .. }
        | TypeKind::NumberLiteral { .. }
        | TypeKind::BooleanLiteral { .. }
        | TypeKind::KeyOf { .. } => Ok(Vec::new()),
        TypeKind::Array { .. } => Ok(vec!["length".to_string()]),
        TypeKind::Interface { fields, heritage } => {
            let mut properties = Vec::new();
            for field in fields {
                push_unique(&mut properties, field.name.clone());
            }
            for base in heritage {
                for property in properties_of_type(schema, base)? {
                    push_unique(&mut properties, property);
                }
            }
            Ok(properties)
        }
        TypeKind::Union { union_members, .. } => merged_properties(schema, union_members),
        TypeKind::Intersection { intersection_members } => {
            merged_properties(schema, intersection_members)
        }
        TypeKind::Partial { element_type } => properties_of_type(schema, element_type),
        TypeKind::Omit { base, omitted_fields } => {
            let properties = properties_of_type(schema, base)?;
            Ok(properties.into_iter().filter(|name| !omitted_fields.contains(name)).collect())
        }
        TypeKind::Mapped { map_from, .. } => {
            let source = resolve::resolve_type(schema, map_from)?;
            match &source.kind {
                TypeKind::String { .. } => Err(SchemaError::OpenPropertySet {
                    type_name: display::type_to_string(&resolved, true),
                }),
                _ => match resolve::enum_values(schema, &source)? {
                    Some(values) => {
                        let mut properties = Vec::new();
                        for value in values {
                            push_unique(&mut properties, value);
                        }
                        Ok(properties)
                    }
                    None => Err(SchemaError::UnsupportedMapFrom {
                        type_name: display::type_to_string(&source, true),
                    }),
                },
            }
        }
        TypeKind::IndexSignature { .. } => Err(SchemaError::OpenPropertySet {
            type_name: display::type_to_string(&resolved, true),
        }),
        // Unreachable after resolution; surfaced as a schema bug.
        TypeKind::Reference { referenced_type_name } => Err(SchemaError::UndefinedReference {
            name: referenced_type_name.clone(),
        }),
    }
}

/// Accumulates member property sets, deduplicated preserving first
/// occurrence.
fn merged_properties(schema: &Schema, members: &[TypeNode]) -> Result<Vec<String>, SchemaError> {
    let mut properties = Vec::new();
    for member in members {
        for property in properties_of_type(schema, member)? {
            push_unique(&mut properties, property);
        }
    }
    Ok(properties)
}

/// Appends `property` unless already present.
fn push_unique(properties: &mut Vec<String>, property: String) {
    if !properties.contains(&property) {
        properties.push(property);
    }
}
