// typegate-core/src/schema/resolve.rs
// ============================================================================
// Module: Typegate Reference Resolution
// Description: Reference chasing, enum detection, and discriminant scanning.
// Purpose: Reduce nodes to their structural form while preserving aliases.
// Dependencies: crate::schema::node
// ============================================================================

//! ## Overview
//! References are by string name, so resolution is a lookup walk rather than
//! pointer chasing. The resolved copy keeps the last-seen reference name as
//! its `name` so diagnostics print the user-visible alias instead of the
//! structural form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::schema::SchemaError;
use crate::schema::node::Schema;
use crate::schema::node::TypeKind;
use crate::schema::node::TypeNode;

// ============================================================================
// SECTION: Reference Resolution
// ============================================================================

/// Resolves `node` to the first non-reference node reachable from it.
///
/// The returned copy carries the last-seen reference name as its `name`.
///
/// # Errors
///
/// Returns [`SchemaError::UndefinedReference`] when a referenced name is
/// missing and [`SchemaError::Malformed`] when references form a cycle with
/// no structural node.
pub fn resolve_type(schema: &Schema, node: &TypeNode) -> Result<TypeNode, SchemaError> {
    resolve_in(&schema.types, node)
}

/// Resolution against a bare name-to-node map.
pub(crate) fn resolve_in(
    types: &BTreeMap<String, TypeNode>,
    node: &TypeNode,
) -> Result<TypeNode, SchemaError> {
    let mut current = node.clone();
    let mut alias: Option<String> = None;
    let mut visited: BTreeSet<String> = BTreeSet::new();

    while let TypeKind::Reference { referenced_type_name } = &current.kind {
        let name = referenced_type_name.clone();
        if !visited.insert(name.clone()) {
            return Err(SchemaError::Malformed(format!(
                "circular type reference through '{name}'"
            )));
        }
        let target = types.get(&name).ok_or_else(|| SchemaError::UndefinedReference {
            name: name.clone(),
        })?;
        current = target.clone();
        alias = Some(name);
    }

    if let Some(name) = alias {
        current.name = Some(name);
    }
    Ok(current)
}

// ============================================================================
// SECTION: Enum Detection
// ============================================================================

/// Returns the literal values of an enum-like node in schema order, or
/// `None` when the node is not enum-like.
///
/// A node is enum-like when it is a single string literal or a union whose
/// every member resolves to a string literal.
///
/// # Errors
///
/// Returns [`SchemaError::UndefinedReference`] when resolution fails.
pub fn enum_values(schema: &Schema, node: &TypeNode) -> Result<Option<Vec<String>>, SchemaError> {
    let resolved = resolve_type(schema, node)?;
    match &resolved.kind {
        TypeKind::StringLiteral { value } => Ok(Some(vec![value.clone()])),
        TypeKind::Union { union_members, .. } => {
            let mut values = Vec::with_capacity(union_members.len());
            for member in union_members {
                let member = resolve_type(schema, member)?;
                let TypeKind::StringLiteral { value } = &member.kind else {
                    return Ok(None);
                };
                values.push(value.clone());
            }
            Ok(Some(values))
        }
        _ => Ok(None),
    }
}

/// Returns true when the node is enum-like.
///
/// # Errors
///
/// Returns [`SchemaError::UndefinedReference`] when resolution fails.
pub fn is_enum(schema: &Schema, node: &TypeNode) -> Result<bool, SchemaError> {
    Ok(enum_values(schema, node)?.is_some())
}

// ============================================================================
// SECTION: Discriminant Scanning
// ============================================================================

/// Returns the discriminant literal of a union member: the value of its
/// non-optional `kind` string-literal field, when the member resolves to an
/// interface carrying one.
pub(crate) fn member_discriminant(
    types: &BTreeMap<String, TypeNode>,
    member: &TypeNode,
) -> Result<Option<String>, SchemaError> {
    let resolved = resolve_in(types, member)?;
    let TypeKind::Interface { fields, .. } = &resolved.kind else {
        return Ok(None);
    };
    for field in fields {
        if field.name != "kind" || field.optional {
            continue;
        }
        let field_type = resolve_in(types, &field.field_type)?;
        if let TypeKind::StringLiteral { value } = &field_type.kind {
            return Ok(Some(value.clone()));
        }
        return Ok(None);
    }
    Ok(None)
}

/// Computes the discriminant cache for a union's members, or `None` when any
/// member lacks a discriminant or two members share one.
pub(crate) fn union_discriminants(
    types: &BTreeMap<String, TypeNode>,
    members: &[TypeNode],
) -> Option<Vec<String>> {
    let mut kinds = Vec::with_capacity(members.len());
    for member in members {
        let Ok(Some(kind)) = member_discriminant(types, member) else {
            return None;
        };
        if kinds.contains(&kind) {
            return None;
        }
        kinds.push(kind);
    }
    if kinds.is_empty() { None } else { Some(kinds) }
}
