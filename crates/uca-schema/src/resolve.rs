//! # Type Resolution
//!
//! Follows a definition's `type` through identifier references until it
//! reaches a primitive name or an inline object schema.
//!
//! ## Depth Limit
//!
//! Reference chains must be acyclic. Rather than relying on stack overflow,
//! every walk stops after [`MAX_RESOLUTION_DEPTH`] steps with
//! [`UcaError::DepthExceeded`].

use std::borrow::Cow;
use std::collections::BTreeSet;

use uca_core::{LeafType, UcaError, UcaResult};

use crate::definition::{Constraints, Definition, ObjectSchema, PropertyDef, TypeRef};
use crate::registry::DefinitionRegistry;

/// Maximum reference-chain length and object nesting depth.
pub const MAX_RESOLUTION_DEPTH: usize = 16;

/// Terminal type of a definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConcreteType<'a> {
    /// A primitive leaf.
    Primitive(LeafType),
    /// An object schema driving composite construction.
    Object(&'a ObjectSchema),
}

/// Result of [`resolve_concrete_type`]: the terminal type and the
/// definition that declared it.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// Terminal type.
    pub concrete: ConcreteType<'a>,
    /// Definition at the end of the reference chain.
    pub terminal: &'a Definition,
}

impl<'a> Resolved<'a> {
    /// Resolved leaf type name.
    pub fn leaf_type(&self) -> LeafType {
        match self.concrete {
            ConcreteType::Primitive(leaf) => leaf,
            ConcreteType::Object(_) => LeafType::Object,
        }
    }

    /// The object schema, for composite types.
    pub fn object_schema(&self) -> Option<&'a ObjectSchema> {
        match self.concrete {
            ConcreteType::Object(schema) => Some(schema),
            ConcreteType::Primitive(_) => None,
        }
    }

    /// Constraints that apply to values of `root`: the root's own when it
    /// declares any, otherwise those of the terminal definition.
    pub fn constraints_for(&self, root: &'a Definition) -> &'a Constraints {
        if root.constraints.is_empty() {
            &self.terminal.constraints
        } else {
            &root.constraints
        }
    }
}

/// Resolve `definition` to its terminal primitive name or object schema.
///
/// # Errors
///
/// [`UcaError::UnknownIdentifier`] for a dangling reference,
/// [`UcaError::DepthExceeded`] for a chain longer than the limit.
pub fn resolve_concrete_type<'a>(
    registry: &'a DefinitionRegistry,
    definition: &'a Definition,
) -> UcaResult<Resolved<'a>> {
    let mut current = definition;
    for _ in 0..MAX_RESOLUTION_DEPTH {
        match &current.type_ref {
            TypeRef::Object(schema) => {
                return Ok(Resolved {
                    concrete: ConcreteType::Object(schema),
                    terminal: current,
                })
            }
            TypeRef::Named(name) => {
                if let Some(leaf) = LeafType::from_primitive_name(name) {
                    return Ok(Resolved {
                        concrete: ConcreteType::Primitive(leaf),
                        terminal: current,
                    });
                }
                current = registry
                    .resolve_reference(name, &current.version)
                    .ok_or_else(|| UcaError::UnknownIdentifier {
                        identifier: name.clone(),
                        version: None,
                    })?;
                tracing::trace!(
                    from = %definition.identifier,
                    to = %current.identifier,
                    "followed type reference"
                );
            }
        }
    }
    Err(UcaError::DepthExceeded {
        identifier: definition.identifier.to_string(),
        limit: MAX_RESOLUTION_DEPTH,
    })
}

/// Resolved leaf type name: `String`, `Number`, `Boolean` or `Object`.
pub fn resolve_leaf_type_name(
    registry: &DefinitionRegistry,
    definition: &Definition,
) -> UcaResult<LeafType> {
    resolve_concrete_type(registry, definition).map(|r| r.leaf_type())
}

/// Definition that drives construction of `property` under `parent`.
///
/// A referenced identifier is looked up in the registry (the property's
/// explicit version, else the parent's version, else the first registered).
/// A primitive name or inline object yields a synthesized
/// [`Definition::inline_child`].
pub fn resolve_property<'r>(
    registry: &'r DefinitionRegistry,
    parent: &Definition,
    property: &PropertyDef,
) -> UcaResult<Cow<'r, Definition>> {
    match property.type_ref.reference() {
        Some(target) => {
            let found = match &property.version {
                Some(v) => registry.get(target, Some(v.as_str())),
                None => registry.resolve_reference(target, &parent.version),
            };
            found
                .map(Cow::Borrowed)
                .ok_or_else(|| UcaError::UnknownIdentifier {
                    identifier: target.to_string(),
                    version: property.version.clone(),
                })
        }
        None => Ok(Cow::Owned(Definition::inline_child(parent, property))),
    }
}

/// Names embedded in the commitment segments of every primitive leaf
/// reachable from `definition`.
pub fn descendant_leaf_names(
    registry: &DefinitionRegistry,
    definition: &Definition,
) -> UcaResult<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    collect_leaf_names(registry, definition, 0, &mut names)?;
    Ok(names)
}

fn collect_leaf_names(
    registry: &DefinitionRegistry,
    definition: &Definition,
    depth: usize,
    names: &mut BTreeSet<String>,
) -> UcaResult<()> {
    if depth >= MAX_RESOLUTION_DEPTH {
        return Err(UcaError::DepthExceeded {
            identifier: definition.identifier.to_string(),
            limit: MAX_RESOLUTION_DEPTH,
        });
    }
    let resolved = resolve_concrete_type(registry, definition)?;
    match resolved.object_schema() {
        None => {
            names.insert(definition.identifier.attestable_name().to_string());
        }
        Some(schema) => {
            for property in &schema.properties {
                let child = resolve_property(registry, definition, property)?;
                collect_leaf_names(registry, &child, depth + 1, names)?;
            }
        }
    }
    Ok(())
}

/// Claim paths (`person.name.first`) of every primitive leaf reachable from
/// `definition`, sorted.
pub fn all_claim_paths(
    registry: &DefinitionRegistry,
    definition: &Definition,
) -> UcaResult<Vec<String>> {
    let base = definition
        .identifier
        .claim_path()
        .unwrap_or_else(|| definition.identifier.to_string());
    let mut paths = Vec::new();
    collect_claim_paths(registry, definition, base, 0, &mut paths)?;
    paths.sort();
    Ok(paths)
}

fn collect_claim_paths(
    registry: &DefinitionRegistry,
    definition: &Definition,
    path: String,
    depth: usize,
    paths: &mut Vec<String>,
) -> UcaResult<()> {
    if depth >= MAX_RESOLUTION_DEPTH {
        return Err(UcaError::DepthExceeded {
            identifier: definition.identifier.to_string(),
            limit: MAX_RESOLUTION_DEPTH,
        });
    }
    let resolved = resolve_concrete_type(registry, definition)?;
    match resolved.object_schema() {
        None => paths.push(path),
        Some(schema) => {
            for property in &schema.properties {
                let child = resolve_property(registry, definition, property)?;
                let child_path = format!("{path}.{}", property.name);
                collect_claim_paths(registry, &child, child_path, depth + 1, paths)?;
            }
        }
    }
    Ok(())
}
