// typegate-extract/src/lower.rs
// ============================================================================
// Module: Declaration Lowering
// Description: AST-to-schema lowering with cross-declaration resolution.
// Purpose: Build canonical type nodes from parsed declarations.
// Dependencies: crate::parser, typegate-core
// ============================================================================

//! ## Overview
//! Lowering runs twice. The first pass lowers every asserted declaration
//! without cross-declaration context, which is enough for all constructs
//! except `Omit` selectors, indexed access, and mapped-source validation.
//! The second pass re-lowers with the first pass's schema as context, so
//! selectors can reduce through references regardless of declaration order.
//!
//! Union members are sorted by their printed form so persisted schemas stay
//! byte-stable across extraction runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use typegate_core::FieldSpec;
use typegate_core::Schema;
use typegate_core::SchemaError;
use typegate_core::StringFormat;
use typegate_core::TypeKind;
use typegate_core::TypeNode;
use typegate_core::enum_values;
use typegate_core::properties_of_type;
use typegate_core::resolve_type;
use typegate_core::type_to_string;

use crate::ExtractError;
use crate::parser::DeclBody;
use crate::parser::Declaration;
use crate::parser::Member;
use crate::parser::TypeExpr;

// ============================================================================
// SECTION: Schema Assembly
// ============================================================================

/// Lowers parsed declarations into a finished schema.
pub(crate) fn lower_declarations(
    declarations: Vec<Declaration>,
) -> Result<Schema, ExtractError> {
    let asserted: Vec<Declaration> =
        declarations.into_iter().filter(|declaration| declaration.asserted).collect();

    let mut schema = Schema::new();
    for declaration in &asserted {
        if schema.types.contains_key(&declaration.name) {
            return Err(ExtractError::DuplicateType {
                name: declaration.name.clone(),
            });
        }
        let node = lower_declaration(declaration, None)?;
        schema.types.insert(declaration.name.clone(), node);
    }

    let context = schema.clone();
    for declaration in &asserted {
        let node = lower_declaration(declaration, Some(&context))?;
        schema.types.insert(declaration.name.clone(), node);
    }

    schema.asserted_types = schema.types.keys().cloned().collect();
    schema.attach_union_discriminants();
    Ok(schema)
}

/// Lowers one declaration and stamps its shared attributes.
fn lower_declaration(
    declaration: &Declaration,
    context: Option<&Schema>,
) -> Result<TypeNode, ExtractError> {
    let mut node = match &declaration.body {
        DeclBody::Interface { heritage, members } => {
            lower_interface_body(declaration, heritage, members, context)?
        }
        DeclBody::Alias(expr) => lower_expr(&declaration.file, expr, context)?,
    };

    // A declaration named after a built-in format brands its string body.
    if let TypeKind::String { special_name } = &mut node.kind {
        if special_name.is_none() {
            *special_name = StringFormat::from_name(&declaration.name);
        }
    }

    node.name = Some(declaration.name.clone());
    node.filename = Some(declaration.file.clone());
    if declaration.ignore_changes {
        node.ignore_changes = Some(true);
    }
    Ok(node)
}

/// Lowers an interface declaration body, applying the index-signature rules.
fn lower_interface_body(
    declaration: &Declaration,
    heritage: &[String],
    members: &[Member],
    context: Option<&Schema>,
) -> Result<TypeNode, ExtractError> {
    let object = lower_object(&declaration.file, declaration.line, members, context)?;
    if matches!(object.kind, TypeKind::IndexSignature { .. }) {
        if heritage.is_empty() {
            return Ok(object);
        }
        return Err(ExtractError::IndexSignatureHeritage {
            file: declaration.file.clone(),
            line: declaration.line,
        });
    }
    let TypeKind::Interface { fields, .. } = object.kind else {
        return Err(ExtractError::Parse {
            file: declaration.file.clone(),
            line: declaration.line,
            message: "interface body did not lower to a record".to_string(),
        });
    };
    Ok(TypeNode::new(TypeKind::Interface {
        fields,
        heritage: heritage.iter().map(|name| TypeNode::reference(name.clone())).collect(),
    }))
}

// ============================================================================
// SECTION: Expression Lowering
// ============================================================================

fn lower_expr(
    file: &str,
    expr: &TypeExpr,
    context: Option<&Schema>,
) -> Result<TypeNode, ExtractError> {
    match expr {
        TypeExpr::Name(word) => Ok(lower_name(word)),
        TypeExpr::StringLit(value) => {
            Ok(TypeNode::new(TypeKind::StringLiteral { value: value.clone() }))
        }
        TypeExpr::NumberLit(value) => {
            Ok(TypeNode::new(TypeKind::NumberLiteral { value: *value }))
        }
        TypeExpr::BoolLit(value) => {
            Ok(TypeNode::new(TypeKind::BooleanLiteral { value: *value }))
        }
        TypeExpr::Applied { name, args, line } => match (name.as_str(), args.len()) {
            ("Array", 1) => Ok(TypeNode::new(TypeKind::Array {
                element_type: Box::new(lower_expr(file, &args[0], context)?),
            })),
            ("Partial", 1) => Ok(TypeNode::new(TypeKind::Partial {
                element_type: Box::new(lower_expr(file, &args[0], context)?),
            })),
            ("Record", 2) => lower_mapped(file, &args[0], &args[1], false, context),
            ("Omit", 2) => lower_omit(file, &args[0], &args[1], context),
            _ => Err(ExtractError::UnknownGeneric {
                file: file.to_string(),
                line: *line,
                name: name.clone(),
            }),
        },
        TypeExpr::KeyOf(inner) => Ok(TypeNode::new(TypeKind::KeyOf {
            base: Box::new(lower_expr(file, inner, context)?),
        })),
        TypeExpr::Union(members) => {
            let mut lowered = Vec::with_capacity(members.len());
            for member in members {
                lowered.push(lower_expr(file, member, context)?);
            }
            lowered.sort_by(|left, right| {
                type_to_string(left, true).cmp(&type_to_string(right, true))
            });
            Ok(TypeNode::new(TypeKind::Union {
                union_members: lowered,
                kinds: None,
            }))
        }
        TypeExpr::Intersection(members) => {
            if let Some(branded) = branded_primitive(members) {
                return Ok(branded);
            }
            let mut lowered = Vec::with_capacity(members.len());
            for member in members {
                lowered.push(lower_expr(file, member, context)?);
            }
            Ok(TypeNode::new(TypeKind::Intersection {
                intersection_members: lowered,
            }))
        }
        TypeExpr::Object { members, line } => lower_object(file, *line, members, context),
        TypeExpr::Mapped { key_source, value, optional } => {
            lower_mapped(file, key_source, value, *optional, context)
        }
        TypeExpr::IndexedAccess { base, key } => {
            lower_indexed_access(file, base, key, context)
        }
    }
}

/// Lowers a bare name: keywords to their kinds, everything else to a
/// reference.
fn lower_name(word: &str) -> TypeNode {
    let kind = match word {
        "string" => TypeKind::String { special_name: None },
        "number" => TypeKind::Number,
        "boolean" => TypeKind::Boolean,
        "null" => TypeKind::Null,
        "undefined" => TypeKind::Undefined,
        "unknown" => TypeKind::Unknown,
        other => TypeKind::Reference {
            referenced_type_name: other.to_string(),
        },
    };
    TypeNode::new(kind)
}

/// Detects `string & { _brand: … }` and lowers it to plain string.
fn branded_primitive(members: &[TypeExpr]) -> Option<TypeNode> {
    if members.len() != 2 {
        return None;
    }
    let has_string =
        members.iter().any(|member| matches!(member, TypeExpr::Name(word) if word == "string"));
    if !has_string {
        return None;
    }
    let brand = members.iter().find_map(|member| match member {
        TypeExpr::Object { members, .. } => Some(members),
        _ => None,
    })?;
    let single_underscore_member = brand.len() == 1
        && matches!(&brand[0], Member::Field { name, .. } if name.starts_with('_'));
    if single_underscore_member {
        Some(TypeNode::new(TypeKind::String { special_name: None }))
    } else {
        None
    }
}

/// Lowers an object body to an interface or index-signature node.
fn lower_object(
    file: &str,
    line: usize,
    members: &[Member],
    context: Option<&Schema>,
) -> Result<TypeNode, ExtractError> {
    let mut fields = Vec::new();
    let mut index_values = Vec::new();
    for member in members {
        match member {
            Member::Field { name, optional, ty } => fields.push(FieldSpec {
                name: name.clone(),
                optional: *optional,
                field_type: lower_expr(file, ty, context)?,
            }),
            Member::IndexSignature { value } => index_values.push(value),
        }
    }

    if let Some(value) = index_values.first() {
        if !fields.is_empty() || index_values.len() > 1 {
            return Err(ExtractError::MixedMembers {
                file: file.to_string(),
                line,
            });
        }
        return Ok(TypeNode::new(TypeKind::IndexSignature {
            key_type: Box::new(TypeNode::new(TypeKind::String { special_name: None })),
            value_type: Box::new(lower_expr(file, value, context)?),
        }));
    }

    Ok(TypeNode::new(TypeKind::Interface {
        fields,
        heritage: Vec::new(),
    }))
}

/// Lowers `Record<K, V>` or `{ [key in K]?: V }`, validating the key source
/// once context is available.
fn lower_mapped(
    file: &str,
    key_expr: &TypeExpr,
    value_expr: &TypeExpr,
    optional: bool,
    context: Option<&Schema>,
) -> Result<TypeNode, ExtractError> {
    let mut map_from = lower_expr(file, key_expr, context)?;
    let map_to = lower_expr(file, value_expr, context)?;

    if let Some(schema) = context {
        // keyof sources reduce to the literal union of the property set.
        if let TypeKind::KeyOf { base } = &map_from.kind {
            let names = properties_of_type(schema, base)?;
            map_from = TypeNode::new(TypeKind::Union {
                union_members: names
                    .into_iter()
                    .map(|name| TypeNode::new(TypeKind::StringLiteral { value: name }))
                    .collect(),
                kinds: None,
            });
        }
        let resolved = resolve_type(schema, &map_from)?;
        let valid = matches!(resolved.kind, TypeKind::String { .. })
            || enum_values(schema, &resolved)?.is_some();
        if !valid {
            return Err(ExtractError::Schema(SchemaError::UnsupportedMapFrom {
                type_name: type_to_string(&resolved, true),
            }));
        }
    }

    Ok(TypeNode::new(TypeKind::Mapped {
        map_from: Box::new(map_from),
        map_to: Box::new(map_to),
        optional,
    }))
}

/// Lowers `Omit<T, K>`, reducing the selector to its literal field names
/// once context is available.
fn lower_omit(
    file: &str,
    base_expr: &TypeExpr,
    selector_expr: &TypeExpr,
    context: Option<&Schema>,
) -> Result<TypeNode, ExtractError> {
    let base = lower_expr(file, base_expr, context)?;
    let selector = lower_expr(file, selector_expr, context)?;

    let omitted_fields = match context {
        None => Vec::new(),
        Some(schema) => {
            // Selectors reduce through references, so an aliased keyof is
            // only visible after resolution.
            let resolved = resolve_type(schema, &selector)?;
            match &resolved.kind {
                TypeKind::KeyOf { base } => properties_of_type(schema, base)?,
                _ => enum_values(schema, &resolved)?.ok_or_else(|| {
                    ExtractError::OmitSelectorNotEnum {
                        selector: type_to_string(&selector, true),
                    }
                })?,
            }
        }
    };

    Ok(TypeNode::new(TypeKind::Omit {
        base: Box::new(base),
        omitted_fields,
    }))
}

/// Lowers `T['k']` by resolving the field's declared type once context is
/// available.
fn lower_indexed_access(
    file: &str,
    base_expr: &TypeExpr,
    key: &str,
    context: Option<&Schema>,
) -> Result<TypeNode, ExtractError> {
    let base = lower_expr(file, base_expr, context)?;
    let Some(schema) = context else {
        // Placeholder; the context pass replaces it.
        return Ok(TypeNode::new(TypeKind::Unknown));
    };

    let resolved = resolve_type(schema, &base)?;
    match field_type_through_heritage(schema, &resolved, key)? {
        Some(field_type) => Ok(field_type),
        None => Err(ExtractError::UnresolvedIndexedAccess {
            base: type_to_string(&base, true),
            key: key.to_string(),
        }),
    }
}

/// Finds a field's declared type on a resolved interface, walking heritage.
fn field_type_through_heritage(
    schema: &Schema,
    resolved: &TypeNode,
    key: &str,
) -> Result<Option<TypeNode>, ExtractError> {
    let TypeKind::Interface { fields, heritage } = &resolved.kind else {
        return Ok(None);
    };
    for field in fields {
        if field.name == key {
            return Ok(Some(field.field_type.clone()));
        }
    }
    for base in heritage {
        let base = resolve_type(schema, base)?;
        if let Some(found) = field_type_through_heritage(schema, &base, key)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
