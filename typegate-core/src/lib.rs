// typegate-core/src/lib.rs
// ============================================================================
// Module: Typegate Core Library
// Description: Public API surface for the Typegate core.
// Purpose: Expose the schema model, property computation, and checker.
// Dependencies: crate::{schema, runtime}
// ============================================================================

//! ## Overview
//! Typegate core holds the closed type-node algebra, reference resolution and
//! printing, property-set computation, and the conformance checker that turns
//! a value plus a type into either an empty string or a multi-line
//! diagnostic. It is backend-agnostic: the extractor and emitter crates build
//! on these types without the core knowing about source files or artifacts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod runtime;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use runtime::ConformanceError;
pub use runtime::StringFormat;
pub use runtime::check_value_against_type;
pub use schema::FieldSpec;
pub use schema::Schema;
pub use schema::SchemaError;
pub use schema::TypeKind;
pub use schema::TypeNode;
pub use schema::display::indent;
pub use schema::display::type_to_string;
pub use schema::properties::properties_of_type;
pub use schema::resolve::enum_values;
pub use schema::resolve::is_enum;
pub use schema::resolve::resolve_type;
