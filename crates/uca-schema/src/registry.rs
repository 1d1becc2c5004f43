//! # Definition Registry
//!
//! An immutable catalog of [`Definition`]s keyed by `(identifier, version)`.
//!
//! ## Loading
//!
//! The registry is built once at process start from a JSON or YAML document
//! holding a list of definition records, and is then only read. Lookups take
//! `&self`, so one registry can serve any number of concurrent
//! constructions without synchronization.
//!
//! ## Lookup Rules
//!
//! - [`DefinitionRegistry::lookup`] with a version selects that exact
//!   version; without one it selects the first registered definition for
//!   the identifier.
//! - [`DefinitionRegistry::resolve_reference`] (used when following a
//!   `type` reference) prefers the referring definition's version and falls
//!   back to the first registered one.
//!
//! ## Integrity
//!
//! Reference cycles and dangling references are configuration defects.
//! [`DefinitionRegistry::check_integrity`] reports every one of them at
//! load time; construction additionally enforces a depth limit.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use thiserror::Error;
use uca_core::{UcaError, UcaResult};

use crate::definition::Definition;
use crate::resolve::{self, MAX_RESOLUTION_DEPTH};

/// Error building or checking a registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry document could not be read.
    #[error("registry load error for '{path}': {reason}")]
    Load {
        /// Path of the registry document.
        path: String,
        /// Reason the document could not be read.
        reason: String,
    },

    /// The registry document is not a valid list of definitions.
    #[error("registry parse error: {0}")]
    Parse(String),

    /// Two definitions share `(identifier, version)`.
    #[error("duplicate definition '{identifier}' version {version}")]
    Duplicate {
        /// The repeated identifier.
        identifier: String,
        /// The repeated version.
        version: String,
    },

    /// The registry contains configuration defects.
    #[error("registry integrity check failed:\n{}", format_violations(.0))]
    Integrity(Vec<IntegrityViolation>),
}

/// A single configuration defect found by [`DefinitionRegistry::check_integrity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityViolation {
    /// Identifier of the offending definition.
    pub identifier: String,
    /// Version of the offending definition.
    pub version: String,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} (version {}): {}", self.identifier, self.version, self.message)
    }
}

fn format_violations(violations: &[IntegrityViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read-only catalog of attribute definitions.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: Vec<Definition>,
    /// identifier -> indices into `definitions`, in registration order.
    index: HashMap<String, Vec<usize>>,
}

impl DefinitionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from definitions, rejecting duplicate
    /// `(identifier, version)` pairs.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = Definition>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.insert(definition)?;
        }
        Ok(registry)
    }

    /// Parse a JSON array of definition records.
    pub fn from_json_str(content: &str) -> Result<Self, RegistryError> {
        let definitions: Vec<Definition> =
            serde_json::from_str(content).map_err(|e| RegistryError::Parse(e.to_string()))?;
        Self::from_definitions(definitions)
    }

    /// Parse a YAML sequence of definition records.
    pub fn from_yaml_str(content: &str) -> Result<Self, RegistryError> {
        let definitions: Vec<Definition> =
            serde_yaml::from_str(content).map_err(|e| RegistryError::Parse(e.to_string()))?;
        Self::from_definitions(definitions)
    }

    /// Load a registry document from disk. `.yaml`/`.yml` files are parsed
    /// as YAML, everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::Load {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let registry = match ext {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
        .map_err(|e| match e {
            RegistryError::Parse(reason) => RegistryError::Load {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        tracing::debug!(
            path = %path.display(),
            definitions = registry.len(),
            "loaded definition registry"
        );
        Ok(registry)
    }

    /// Register one more definition.
    pub fn insert(&mut self, definition: Definition) -> Result<(), RegistryError> {
        let key = definition.identifier.as_str().to_string();
        if self.get(&key, Some(&definition.version)).is_some() {
            return Err(RegistryError::Duplicate {
                identifier: key,
                version: definition.version,
            });
        }
        self.index
            .entry(key)
            .or_default()
            .push(self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// All definitions, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter()
    }

    /// Distinct identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.index.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registered versions of `identifier`, in registration order.
    pub fn versions(&self, identifier: &str) -> Vec<&str> {
        self.candidates(identifier)
            .map(|d| d.version.as_str())
            .collect()
    }

    /// Definitions flagged `credentialItem`: the identifiers that act as
    /// named constructors for the credential layer.
    pub fn credential_items(&self) -> Vec<&Definition> {
        self.definitions.iter().filter(|d| d.credential_item).collect()
    }

    /// `(identifier, version)` lookup; without a version, the first
    /// registered definition for the identifier.
    pub fn get(&self, identifier: &str, version: Option<&str>) -> Option<&Definition> {
        let mut candidates = self.candidates(identifier);
        match version {
            Some(v) => candidates.find(|d| d.version == v),
            None => candidates.next(),
        }
    }

    /// [`get`](Self::get), failing with [`UcaError::UnknownIdentifier`].
    pub fn lookup(&self, identifier: &str, version: Option<&str>) -> UcaResult<&Definition> {
        self.get(identifier, version)
            .ok_or_else(|| UcaError::UnknownIdentifier {
                identifier: identifier.to_string(),
                version: version.map(str::to_string),
            })
    }

    /// Target of a `type` reference: the referrer's version when registered,
    /// otherwise the first registered version.
    pub fn resolve_reference(&self, identifier: &str, preferred_version: &str) -> Option<&Definition> {
        self.get(identifier, Some(preferred_version))
            .or_else(|| self.get(identifier, None))
    }

    /// Every leaf claim path reachable from `identifier`
    /// (e.g. `person.name.first`), sorted.
    pub fn all_claim_paths(&self, identifier: &str, version: Option<&str>) -> UcaResult<Vec<String>> {
        let definition = self.lookup(identifier, version)?;
        resolve::all_claim_paths(self, definition)
    }

    /// Report dangling references, reference cycles, unknown `required`
    /// names, unparsable patterns, and constraints on object types.
    pub fn check_integrity(&self) -> Result<(), RegistryError> {
        let mut violations = Vec::new();

        for definition in &self.definitions {
            let mut report = |message: String| {
                violations.push(IntegrityViolation {
                    identifier: definition.identifier.to_string(),
                    version: definition.version.clone(),
                    message,
                });
            };

            match resolve::resolve_concrete_type(self, definition) {
                Ok(resolved) => {
                    if !resolved.leaf_type().is_primitive() && !definition.constraints.is_empty() {
                        report("value constraints declared on an object type".to_string());
                    }
                }
                Err(UcaError::DepthExceeded { .. }) => {
                    report(format!(
                        "type reference chain does not terminate within {MAX_RESOLUTION_DEPTH} steps (cycle?)"
                    ));
                }
                Err(e) => report(e.to_string()),
            }

            if let Some(pattern) = &definition.constraints.pattern {
                if let Err(e) = pattern.regex() {
                    report(format!("invalid pattern {:?}: {e}", pattern.as_str()));
                }
            }

            if let Some(schema) = definition.object_schema() {
                let declared: BTreeSet<&str> =
                    schema.properties.iter().map(|p| p.name.as_str()).collect();
                for name in &schema.required {
                    if !declared.contains(name.as_str()) {
                        report(format!("required property '{name}' is not declared"));
                    }
                }
                for property in &schema.properties {
                    if let Some(target) = property.type_ref.reference() {
                        let found = match &property.version {
                            Some(v) => self.get(target, Some(v.as_str())),
                            None => self.resolve_reference(target, &definition.version),
                        };
                        if found.is_none() {
                            report(format!(
                                "property '{}' references unknown identifier '{target}'",
                                property.name
                            ));
                        }
                    }
                }
            }

            if let Some(cycle) = self.property_cycle(definition) {
                report(format!("object properties form a reference cycle: {}", cycle.join(" -> ")));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::Integrity(violations))
        }
    }

    fn candidates<'a>(&'a self, identifier: &str) -> impl Iterator<Item = &'a Definition> + 'a {
        self.index
            .get(identifier)
            .map(|indices| indices.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&i| &self.definitions[i])
    }

    /// Identifiers along a chain of property references that leads from
    /// `root` back to itself, starting and ending with `root`.
    ///
    /// A cycle elsewhere in the graph is reported by its own members, not by
    /// every definition that can reach it.
    fn property_cycle(&self, root: &Definition) -> Option<Vec<String>> {
        let mut path = vec![root];
        let mut visited = BTreeSet::new();
        if !self.path_back_to(root, &mut path, &mut visited) {
            return None;
        }
        path.push(root);
        Some(path.iter().map(|d| d.identifier.to_string()).collect())
    }

    fn path_back_to<'a>(
        &'a self,
        root: &Definition,
        path: &mut Vec<&'a Definition>,
        visited: &mut BTreeSet<(&'a str, &'a str)>,
    ) -> bool {
        let Some(&current) = path.last() else {
            return false;
        };
        for next in self.property_targets(current) {
            if next.identifier == root.identifier && next.version == root.version {
                return true;
            }
            if visited.insert((next.identifier.as_str(), next.version.as_str())) {
                path.push(next);
                if self.path_back_to(root, path, visited) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }

    /// Definitions referenced by the properties of `definition`'s object
    /// schema, if it resolves to one.
    fn property_targets<'a>(&'a self, definition: &'a Definition) -> Vec<&'a Definition> {
        let Ok(resolved) = resolve::resolve_concrete_type(self, definition) else {
            return Vec::new();
        };
        let Some(schema) = resolved.object_schema() else {
            return Vec::new();
        };
        schema
            .properties
            .iter()
            .filter_map(|property| {
                let target = property.type_ref.reference()?;
                match &property.version {
                    Some(v) => self.get(target, Some(v.as_str())),
                    None => self.resolve_reference(target, &definition.version),
                }
            })
            .collect()
    }
}
