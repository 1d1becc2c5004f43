//! # uca-attribute — Collectable Attribute Instances
//!
//! Builds salted, hash-committed attribute values against a
//! [`uca_schema::DefinitionRegistry`], serializes them to the canonical
//! URN-pipe commitment, and rebuilds them from such a commitment without
//! drawing new secrets.
//!
//! ## Construction (`attribute`)
//!
//! [`AttributeFactory::construct`] takes an identifier, a
//! [`ConstructionInput`] and an optional version. The input variant picks
//! the mode: a prior commitment, a raw primitive, or a nested mapping.
//!
//! ## Commitments (`commitment`)
//!
//! [`canonical_attestable_value`] and [`parse_commitment`] implement the
//! wire grammar; [`content_id`] derives the instance identifier.
//!
//! ## Disclosure (`disclosure`)
//!
//! [`collect_attestable_values`] and [`plain_value`] serve the credential
//! layer.
//!
//! ## Security Invariant
//!
//! Raw-value leaves draw their salt from the OS CSPRNG. Reconstruction
//! copies salts from the commitment and never draws randomness, so a round
//! trip reproduces the same commitment and content id.
//!
//! ## Crate Policy
//!
//! - The registry is borrowed, never embedded in instances.
//! - No partial instance is ever returned.

pub mod attribute;
pub mod commitment;
pub mod disclosure;

pub use attribute::{AttributeFactory, AttributeInstance, AttributeValue, ConstructionInput};
pub use commitment::{
    canonical_attestable_value, content_id, decode_value, parse_commitment, render_value,
    verify_commitment, CommitmentComponent, NUMBER_WIDTH, SEGMENT_SEPARATOR,
};
pub use disclosure::{collect_attestable_values, plain_value, AttestableValue};
