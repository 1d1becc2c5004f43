//! # Salts
//!
//! A salt hides a leaf value inside its commitment. It is 256 bits drawn
//! from the operating system CSPRNG and rendered as the hex SHA-256 digest
//! of that randomness. Salts are never reversed; they only need to be
//! uniform and unpredictable.
//!
//! `OsRng` is safe to use from any thread, and every call draws fresh
//! entropy, so concurrent constructions never observe each other's salts.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::digest::sha256_hex;

/// Bytes of entropy drawn per salt.
pub const SALT_ENTROPY_BYTES: usize = 32;

/// Draw a fresh salt: `hex(sha256(32 random bytes))`.
pub fn generate_salt() -> String {
    let mut entropy = [0u8; SALT_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut entropy);
    sha256_hex(entropy)
}
