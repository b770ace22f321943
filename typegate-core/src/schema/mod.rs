// typegate-core/src/schema/mod.rs
// ============================================================================
// Module: Typegate Schema Model
// Description: Closed type-node algebra and the operations defined on it.
// Purpose: Provide stable, serializable schema types plus resolution,
//          printing, and property computation.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A schema maps type names to nodes of a closed algebra and lists the names
//! whose validators are asserted. Schemas are produced by the extractor,
//! persisted as canonical JSON, and treated as immutable by the checker.
//! Errors at this layer describe malformed schemas, not malformed values;
//! value-level failures are diagnostics composed by the runtime checker.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod display;
pub mod node;
pub mod properties;
pub mod resolve;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use node::FieldSpec;
pub use node::Schema;
pub use node::TypeKind;
pub use node::TypeNode;

// ============================================================================
// SECTION: Errors
// ============================================================================

use thiserror::Error;

/// Errors raised by schema loading, resolution, and property computation.
///
/// # Invariants
/// - These errors indicate a malformed schema or a caller bug, never a value
///   that merely fails to conform; conformance failures surface as the
///   checker's diagnostic string instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A `reference-type` names a type missing from the schema.
    #[error("type '{name}' is not defined in the schema")]
    UndefinedReference {
        /// The missing type name.
        name: String,
    },
    /// The property set of a type is not finite.
    #[error("the property set of {type_name} is not finite")]
    OpenPropertySet {
        /// Printed form of the offending type.
        type_name: String,
    },
    /// `Partial` was applied to something other than an interface.
    #[error("Partial<{type_name}> requires an interface element")]
    PartialOnNonInterface {
        /// Printed form of the offending element type.
        type_name: String,
    },
    /// A mapped type's source does not reduce to string or string literals.
    #[error("mapped type source {type_name} must reduce to string or string literals")]
    UnsupportedMapFrom {
        /// Printed form of the offending source type.
        type_name: String,
    },
    /// The schema JSON or object graph is structurally invalid.
    #[error("malformed schema: {0}")]
    Malformed(String),
    /// Serializing a schema or node to JSON failed.
    #[error("schema serialization failed: {0}")]
    Serialization(String),
}
