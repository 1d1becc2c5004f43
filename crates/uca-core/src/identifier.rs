//! # Attribute Identifiers
//!
//! Newtype for the `namespace:Category:property` key of a definition, and
//! the pure string derivations built on it:
//!
//! - [`Identifier::attestable_name`] — the name embedded in commitment
//!   segments (`urn:{name}:...`).
//! - [`Identifier::root_property_name`], [`Identifier::property_name`],
//!   [`Identifier::claim_path`] — the claim-path helpers used by the
//!   credential layer.
//!
//! None of these recurse or touch the registry.

use serde::{Deserialize, Serialize};

/// Key of an attribute definition, conventionally `namespace:Category:property`.
///
/// Nested properties declared inline are addressed by appending
/// `.{property}` to the parent identifier (e.g. `ns:Person:name.first`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap an identifier string.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier of an inline child property: `{self}.{property}`.
    pub fn child(&self, property: &str) -> Self {
        Self(format!("{}.{property}", self.0))
    }

    /// Name embedded in commitment segments: the substring after the final
    /// `.` when the identifier contains one, else after the final `:`.
    pub fn attestable_name(&self) -> &str {
        attestable_name_of(&self.0)
    }

    /// Lowercased category component (`ns:Person:age` → `person`).
    ///
    /// Returns `None` when the identifier has no category component.
    pub fn root_property_name(&self) -> Option<String> {
        self.0.split(':').nth(1).map(str::to_lowercase)
    }

    /// Property component (`ns:Person:age` → `age`). Everything after the
    /// second `:` is kept, so inline children yield `name.first`.
    pub fn property_name(&self) -> Option<&str> {
        self.0.splitn(3, ':').nth(2)
    }

    /// `{root_property_name}.{property_name}`, e.g. `person.age`.
    pub fn claim_path(&self) -> Option<String> {
        let root = self.root_property_name()?;
        let property = self.property_name()?;
        Some(format!("{root}.{property}"))
    }
}

/// [`Identifier::attestable_name`] over a borrowed string.
pub fn attestable_name_of(identifier: &str) -> &str {
    match identifier.rfind('.') {
        Some(idx) => &identifier[idx + 1..],
        None => match identifier.rfind(':') {
            Some(idx) => &identifier[idx + 1..],
            None => identifier,
        },
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
