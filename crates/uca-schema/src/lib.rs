//! # uca-schema — Attribute Definitions
//!
//! Everything the attribute engine knows about a definition before it sees
//! a value.
//!
//! ## Definitions (`definition`)
//!
//! [`Definition`] mirrors the external definition record: identifier,
//! version, a [`TypeRef`] that is a primitive name, another identifier, or an
//! inline [`ObjectSchema`], the value constraints, and the two disclosure
//! flags.
//!
//! ## Registry (`registry`)
//!
//! [`DefinitionRegistry`] is built once (from JSON or YAML) and then only
//! read. It is `Send + Sync` and is passed by reference into every
//! construction; there is no ambient global registry.
//!
//! ## Resolution (`resolve`) and validation (`validate`)
//!
//! [`resolve_leaf_type_name`] and [`resolve_concrete_type`] follow identifier
//! references to a primitive or an object schema, with a hard depth limit.
//! [`type_matches`] and [`satisfies_constraints`] check raw values.
//!
//! ## Crate Policy
//!
//! - Depends only on `uca-core` internally.
//! - The registry is immutable after load; nothing here holds interior
//!   mutability.

pub mod definition;
pub mod registry;
pub mod resolve;
pub mod validate;

pub use definition::{Constraints, Definition, ObjectSchema, Pattern, PropertyDef, TypeRef};
pub use registry::{DefinitionRegistry, IntegrityViolation, RegistryError};
pub use resolve::{
    all_claim_paths, descendant_leaf_names, resolve_concrete_type, resolve_leaf_type_name,
    resolve_property, ConcreteType, Resolved, MAX_RESOLUTION_DEPTH,
};
pub use validate::{check_value, satisfies_constraints, type_matches};
