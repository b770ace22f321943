// typegate-core/src/schema/node.rs
// ============================================================================
// Module: Typegate Type Nodes
// Description: The closed algebra of type nodes and the schema container.
// Purpose: Define serializable schema structures with canonical persistence.
// Dependencies: crate::schema::resolve, serde, serde_json
// ============================================================================

//! ## Overview
//! Every type the extractor can lower is one node of the closed algebra
//! below, tagged by `kind` in the persisted JSON. Nodes carry three optional
//! attributes shared across kinds: a declared `name`, a source `filename`,
//! and an advisory `ignoreChanges` flag that the checker never reads.
//!
//! Unknown keys on persisted nodes are tolerated on load. Schemas loaded
//! through [`Schema::from_json_str`] get the union discriminant cache
//! attached, so hand-written schemas receive the discriminated fast path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::runtime::StringFormat;
use crate::schema::SchemaError;
use crate::schema::resolve;

// ============================================================================
// SECTION: Schema Container
// ============================================================================

/// A named set of type nodes plus the list of asserted type names.
///
/// # Invariants
/// - Every `reference-type` reachable from `types` names a defined type.
/// - `asserted_types` is sorted and every entry is a key of `types`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Type nodes keyed by declared name.
    pub types: BTreeMap<String, TypeNode>,
    /// Sorted names whose validators are asserted.
    #[serde(rename = "assertedTypes", default)]
    pub asserted_types: Vec<String>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: BTreeMap::new(),
            asserted_types: Vec::new(),
        }
    }

    /// Loads a schema from its persisted JSON form.
    ///
    /// The union discriminant cache is attached after deserialization so the
    /// checker's discriminated fast path works for hand-written schemas too.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Malformed`] when the JSON does not describe a
    /// schema.
    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        let mut schema: Self =
            serde_json::from_str(raw).map_err(|err| SchemaError::Malformed(err.to_string()))?;
        schema.attach_union_discriminants();
        Ok(schema)
    }

    /// Renders the canonical JSON form: stable key order, 2-space indent,
    /// trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Serialization`] when encoding fails.
    pub fn to_canonical_json(&self) -> Result<String, SchemaError> {
        let mut rendered = serde_json::to_string_pretty(self)
            .map_err(|err| SchemaError::Serialization(err.to_string()))?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Looks up a type node by name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UndefinedReference`] when the name is missing.
    pub fn lookup(&self, name: &str) -> Result<&TypeNode, SchemaError> {
        self.types.get(name).ok_or_else(|| SchemaError::UndefinedReference {
            name: name.to_string(),
        })
    }

    /// Attaches the `kinds` cache to every union whose resolved members all
    /// carry a non-optional `kind` string-literal field.
    ///
    /// Unions that already carry a cache keep it. Members that fail to
    /// resolve or carry duplicate discriminants leave the union uncached;
    /// such unions fall back to the generic member-by-member dispatch.
    pub fn attach_union_discriminants(&mut self) {
        let snapshot = self.types.clone();
        for node in self.types.values_mut() {
            attach_discriminants(node, &snapshot);
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively attaches discriminant caches below `node`.
fn attach_discriminants(node: &mut TypeNode, types: &BTreeMap<String, TypeNode>) {
    match &mut node.kind {
        TypeKind::Array { element_type } | TypeKind::Partial { element_type } => {
            attach_discriminants(element_type, types);
        }
        TypeKind::Interface { fields, .. } => {
            for field in fields {
                attach_discriminants(&mut field.field_type, types);
            }
        }
        TypeKind::Union { union_members, kinds } => {
            for member in union_members.iter_mut() {
                attach_discriminants(member, types);
            }
            if kinds.is_none() {
                *kinds = resolve::union_discriminants(types, union_members);
            }
        }
        TypeKind::Intersection { intersection_members } => {
            for member in intersection_members {
                attach_discriminants(member, types);
            }
        }
        TypeKind::Mapped { map_from, map_to, .. } => {
            attach_discriminants(map_from, types);
            attach_discriminants(map_to, types);
        }
        TypeKind::IndexSignature { key_type, value_type } => {
            attach_discriminants(key_type, types);
            attach_discriminants(value_type, types);
        }
        TypeKind::Omit { base, .. } | TypeKind::KeyOf { base } => {
            attach_discriminants(base, types);
        }
        TypeKind::String { .. }
        | TypeKind::Number
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

// ============================================================================
// SECTION: Type Nodes
// ============================================================================

/// One node of the type algebra with its shared optional attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    /// Kind tag plus kind-specific payload.
    #[serde(flatten)]
    pub kind: TypeKind,
    /// Declared name, printed in diagnostics instead of the structural form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Source file the declaration came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Advisory persistence flag; never read by the checker.
    #[serde(default, rename = "ignoreChanges", skip_serializing_if = "Option::is_none")]
    pub ignore_changes: Option<bool>,
}

impl TypeNode {
    /// Creates an unnamed node of the given kind.
    #[must_use]
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            name: None,
            filename: None,
            ignore_changes: None,
        }
    }

    /// Creates a named node of the given kind.
    #[must_use]
    pub fn named(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            filename: None,
            ignore_changes: None,
        }
    }

    /// Creates a reference node pointing at `name`.
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Reference {
            referenced_type_name: name.into(),
        })
    }
}

impl From<TypeKind> for TypeNode {
    fn from(kind: TypeKind) -> Self {
        Self::new(kind)
    }
}

/// Kind-specific payload of a type node, tagged by `kind` in JSON.
///
/// # Invariants
/// - The algebra is closed; checkers dispatch with a single exhaustive match.
/// - `kinds` on a union, when present, is in 1:1 correspondence with the
///   members' non-optional `kind` literal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeKind {
    /// Primitive string, optionally branded with a format name.
    #[serde(rename = "string")]
    String {
        /// Built-in format triggering string sub-validation.
        #[serde(default, rename = "specialName", skip_serializing_if = "Option::is_none")]
        special_name: Option<StringFormat>,
    },
    /// Primitive number.
    #[serde(rename = "number")]
    Number,
    /// Primitive boolean.
    #[serde(rename = "boolean")]
    Boolean,
    /// Exactly the null value.
    #[serde(rename = "null")]
    Null,
    /// Exactly the undefined value; JSON carries no such value, so absence
    /// is handled by the enclosing record frame instead.
    #[serde(rename = "undefined")]
    Undefined,
    /// Top type; accepts everything.
    #[serde(rename = "unknown")]
    Unknown,
    /// Exactly one string value.
    #[serde(rename = "string-literal")]
    StringLiteral {
        /// The literal string.
        value: String,
    },
    /// Exactly one number value.
    #[serde(rename = "number-literal")]
    NumberLiteral {
        /// The literal number.
        value: f64,
    },
    /// Exactly one boolean value.
    #[serde(rename = "boolean-literal")]
    BooleanLiteral {
        /// The literal boolean.
        value: bool,
    },
    /// Ordered sequence of one element type.
    #[serde(rename = "array")]
    Array {
        /// Element type.
        #[serde(rename = "elementType")]
        element_type: Box<TypeNode>,
    },
    /// Structural record with optional base types.
    #[serde(rename = "interface")]
    Interface {
        /// Own fields in declaration order.
        fields: Vec<FieldSpec>,
        /// Base-type references walked after own fields.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        heritage: Vec<TypeNode>,
    },
    /// Any member may match.
    #[serde(rename = "union")]
    Union {
        /// Members in extractor order.
        #[serde(rename = "unionMembers")]
        union_members: Vec<TypeNode>,
        /// Cached discriminant literals for interface unions.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kinds: Option<Vec<String>>,
    },
    /// All members must match.
    #[serde(rename = "intersection")]
    Intersection {
        /// Members in extractor order.
        #[serde(rename = "intersectionMembers")]
        intersection_members: Vec<TypeNode>,
    },
    /// Dictionary over keys drawn from `mapFrom`.
    #[serde(rename = "mapped")]
    Mapped {
        /// Key source; reduces to string or string literals.
        #[serde(rename = "mapFrom")]
        map_from: Box<TypeNode>,
        /// Value type.
        #[serde(rename = "mapTo")]
        map_to: Box<TypeNode>,
        /// Whether keys from a fixed source may be absent.
        #[serde(default)]
        optional: bool,
    },
    /// Open dictionary; every own property must conform to `valueType`.
    #[serde(rename = "index-signature")]
    IndexSignature {
        /// Key type; string keys only in practice, never validated against.
        #[serde(rename = "keyType")]
        key_type: Box<TypeNode>,
        /// Value type.
        #[serde(rename = "valueType")]
        value_type: Box<TypeNode>,
    },
    /// `base` minus the named fields.
    #[serde(rename = "omit")]
    Omit {
        /// Base type.
        base: Box<TypeNode>,
        /// Field names suppressed during descent.
        #[serde(rename = "omittedFields")]
        omitted_fields: Vec<String>,
    },
    /// The string-literal set of `base`'s property names.
    #[serde(rename = "keyof")]
    KeyOf {
        /// Base type.
        base: Box<TypeNode>,
    },
    /// Like the element with all fields optional; interfaces only.
    #[serde(rename = "partial")]
    Partial {
        /// Element type; must resolve to an interface.
        #[serde(rename = "elementType")]
        element_type: Box<TypeNode>,
    },
    /// Name lookup, possibly transitive.
    #[serde(rename = "reference-type")]
    Reference {
        /// Referenced type name.
        #[serde(rename = "referencedTypeName")]
        referenced_type_name: String,
    },
}

/// One field of an interface node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Property name.
    pub name: String,
    /// Whether the field may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Declared field type.
    #[serde(rename = "type")]
    pub field_type: TypeNode,
}

impl FieldSpec {
    /// Creates a required field.
    #[must_use]
    pub fn required(name: impl Into<String>, field_type: TypeNode) -> Self {
        Self {
            name: name.into(),
            optional: false,
            field_type,
        }
    }

    /// Creates an optional field.
    #[must_use]
    pub fn optional(name: impl Into<String>, field_type: TypeNode) -> Self {
        Self {
            name: name.into(),
            optional: true,
            field_type,
        }
    }
}
