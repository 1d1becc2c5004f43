//! # Definition Records
//!
//! Serde model of the externally supplied definition record. Field names
//! are camelCase on the wire (`minimumLength`, `credentialItem`, ...).
//!
//! ```yaml
//! - identifier: ns:Person:name
//!   version: "1"
//!   attestable: true
//!   type:
//!     properties:
//!       - { name: first, type: String }
//!       - { name: last, type: String }
//!     required: [first, last]
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use uca_core::{Identifier, LeafType};

/// The `type` field of a definition or property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    /// A primitive type name (`String`, `Number`, `Boolean`) or the
    /// identifier of another definition.
    Named(String),
    /// An inline object schema.
    Object(ObjectSchema),
}

impl TypeRef {
    /// The primitive leaf type, if this names one directly.
    pub fn primitive(&self) -> Option<LeafType> {
        match self {
            Self::Named(name) => LeafType::from_primitive_name(name),
            Self::Object(_) => None,
        }
    }

    /// The referenced identifier, if this names another definition.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Named(name) if LeafType::from_primitive_name(name).is_none() => Some(name),
            _ => None,
        }
    }
}

/// Inline object schema: ordered properties plus the required subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    /// Declared properties, in declaration order.
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    /// Names of properties that composite input must supply.
    #[serde(default)]
    pub required: Vec<String>,
}

impl ObjectSchema {
    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// One property of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Key of the child in composite values.
    pub name: String,
    /// Primitive name, referenced identifier, or inline object.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Version of the referenced definition; the parent's version is used
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Value constraints. Only meaningful on primitive definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// Regular expression a String value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    /// Minimum String length, in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_length: Option<usize>,
    /// Maximum String length, in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_length: Option<usize>,
    /// Lower Number bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Upper Number bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// When set, `minimum` itself is rejected.
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive_minimum: bool,
    /// When set, `maximum` itself is rejected.
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive_maximum: bool,
}

impl Constraints {
    /// True when no constraint is declared.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
            && self.minimum_length.is_none()
            && self.maximum_length.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
    }
}

/// A `pattern` constraint, compiled once when the record is deserialized.
///
/// A pattern that does not compile is kept with its error, so that
/// [`DefinitionRegistry::check_integrity`](crate::DefinitionRegistry::check_integrity)
/// can report it and validation can reject values against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pattern {
    source: String,
    compiled: Result<Regex, regex::Error>,
}

impl Pattern {
    /// Compile `source`.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source);
        Self { source, compiled }
    }

    /// The expression as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled expression, or why it failed to compile.
    pub fn regex(&self) -> Result<&Regex, &regex::Error> {
        self.compiled.as_ref()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn default_version() -> String {
    "1".to_string()
}

/// A static attribute definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    /// Globally unique key, conventionally `namespace:Category:property`.
    pub identifier: Identifier,
    /// Selects among definitions sharing an identifier.
    #[serde(default = "default_version")]
    pub version: String,
    /// Primitive name, referenced identifier, or inline object schema.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Value constraints.
    #[serde(flatten)]
    pub constraints: Constraints,
    /// Top-level credential item marker.
    #[serde(default)]
    pub credential_item: bool,
    /// Marks the attribute's commitment as disclosable.
    #[serde(default)]
    pub attestable: bool,
}

impl Definition {
    /// A primitive definition with no constraints or flags.
    pub fn primitive(identifier: impl Into<Identifier>, version: &str, leaf: LeafType) -> Self {
        Self {
            identifier: identifier.into(),
            version: version.to_string(),
            type_ref: TypeRef::Named(leaf.as_str().to_string()),
            constraints: Constraints::default(),
            credential_item: false,
            attestable: false,
        }
    }

    /// Definition for a property whose type is declared inline (a primitive
    /// name or an object schema) rather than by reference.
    ///
    /// The child is addressed as `{parent}.{property}` and inherits the
    /// parent's version. It carries no constraints and no disclosure flags.
    pub fn inline_child(parent: &Definition, property: &PropertyDef) -> Self {
        Self {
            identifier: parent.identifier.child(&property.name),
            version: property
                .version
                .clone()
                .unwrap_or_else(|| parent.version.clone()),
            type_ref: property.type_ref.clone(),
            constraints: Constraints::default(),
            credential_item: false,
            attestable: false,
        }
    }

    /// The inline object schema, when `type` is one.
    pub fn object_schema(&self) -> Option<&ObjectSchema> {
        match &self.type_ref {
            TypeRef::Object(schema) => Some(schema),
            TypeRef::Named(_) => None,
        }
    }

    /// True when either disclosure flag is set.
    pub fn is_disclosable(&self) -> bool {
        self.credential_item || self.attestable
    }
}
