//! # Check Subcommand
//!
//! Loads the registry and reports every integrity violation: dangling
//! references, reference cycles, undeclared required properties, bad
//! patterns, and constraints on object types.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use uca_schema::RegistryError;

/// Arguments for the `uca check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Also list the credential items the registry defines.
    #[arg(long)]
    pub list_items: bool,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when the registry is sound, 1 on violations.
pub fn run_check(args: &CheckArgs, registry_path: Option<&Path>) -> Result<u8> {
    let registry = crate::load_registry(registry_path)?;

    let code = match registry.check_integrity() {
        Ok(()) => {
            println!(
                "OK: {} definition(s), {} identifier(s)",
                registry.len(),
                registry.identifiers().len()
            );
            0
        }
        Err(RegistryError::Integrity(violations)) => {
            for violation in &violations {
                println!("FAIL:{violation}");
            }
            println!("\n{} violation(s) found.", violations.len());
            1
        }
        Err(other) => return Err(other.into()),
    };

    if args.list_items {
        for item in registry.credential_items() {
            println!("  credential item: {} (version {})", item.identifier, item.version);
        }
    }
    Ok(code)
}
