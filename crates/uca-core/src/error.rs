//! # Error Types — Attribute Construction Failures
//!
//! All attribute construction failures are local, caller-input errors:
//! nothing is retried and no partial instance is ever published.
//!
//! ## Design
//!
//! - Every variant names the identifier that was being constructed so a
//!   failure deep inside a nested object is still attributable.
//! - Commitment failures carry the offending fragment.

use thiserror::Error;

/// Convenience alias for results produced by attribute construction.
pub type UcaResult<T> = Result<T, UcaError>;

/// Top-level error type for attribute resolution and construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UcaError {
    /// The identifier (and version, if given) is absent from the registry.
    #[error("unknown identifier '{identifier}'{}", version_suffix(.version))]
    UnknownIdentifier {
        /// The identifier that failed to resolve.
        identifier: String,
        /// The requested version, when one was supplied.
        version: Option<String>,
    },

    /// A raw value fails its type or constraints, or fits no construction mode.
    #[error("invalid value for '{identifier}': {reason}")]
    InvalidValue {
        /// The identifier being constructed.
        identifier: String,
        /// First violated rule.
        reason: String,
    },

    /// Composite input omits a property listed in `required`.
    #[error("'{identifier}' is missing required property '{field}'")]
    MissingRequiredField {
        /// The composite identifier being constructed.
        identifier: String,
        /// The missing property name.
        field: String,
    },

    /// A commitment string fails the wire grammar or has an inconsistent
    /// segment count.
    #[error("malformed commitment: {0}")]
    MalformedCommitment(String),

    /// A parsed segment or input key matches no declared property.
    #[error("'{identifier}' declares no property matching '{property}'")]
    UnknownChildProperty {
        /// The composite identifier being constructed.
        identifier: String,
        /// The unmatched property name.
        property: String,
    },

    /// Type resolution or construction nested deeper than the hard limit.
    /// Only reachable through a cyclic or pathological registry.
    #[error("definition chain for '{identifier}' exceeds depth limit {limit}")]
    DepthExceeded {
        /// The identifier at which the limit was hit.
        identifier: String,
        /// The configured limit.
        limit: usize,
    },
}

fn version_suffix(version: &Option<String>) -> String {
    match version {
        Some(v) => format!(" (version {v})"),
        None => String::new(),
    }
}

impl UcaError {
    /// Shorthand for [`UcaError::InvalidValue`].
    pub fn invalid_value(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`UcaError::MalformedCommitment`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedCommitment(reason.into())
    }
}
