//! # uca-core — Foundational Types for Collectable Attributes
//!
//! This crate is the leaf of the `uca` workspace. It defines the small set
//! of primitives every other crate builds on:
//!
//! 1. **`UcaError`** — the construction-time error taxonomy. Every failure
//!    aborts construction of the whole attribute tree; there is no partial
//!    instance.
//!
//! 2. **`Identifier`** — the `namespace:Category:property` key of a
//!    definition, with the pure string derivations the credential layer uses
//!    for claim paths.
//!
//! 3. **`sha256_digest()` / `ContentDigest`** — the single hashing path used
//!    for salts and content identifiers.
//!
//! 4. **`generate_salt()`** — 256 bits from the OS CSPRNG, rendered as the
//!    hex digest of that randomness.
//!
//! 5. **`Timestamp`** — UTC wall-clock time of raw-value construction.
//!
//! 6. **`LeafType` / `PrimitiveValue`** — the resolved type names and the
//!    runtime value of a leaf attribute.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `uca-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identifier;
pub mod salt;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{UcaError, UcaResult};
pub use identifier::Identifier;
pub use salt::{generate_salt, SALT_ENTROPY_BYTES};
pub use temporal::Timestamp;
pub use value::{LeafType, PrimitiveValue};
