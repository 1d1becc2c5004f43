//! # uca-cli — CLI for Collectable Attributes
//!
//! Provides the `uca` command-line interface over a definition registry
//! file.
//!
//! ## Subcommands
//!
//! - `uca construct` — Build an attribute from a raw or nested JSON value.
//! - `uca reconstruct` — Rebuild an attribute from a commitment string.
//! - `uca parse` — Split a commitment into its segments.
//! - `uca resolve` — Show a definition's resolved type and claim paths.
//! - `uca check` — Report registry integrity violations.
//!
//! ## Configuration
//!
//! The registry path comes from `--registry` or the `UCA_REGISTRY`
//! environment variable. `.yaml`/`.yml` files are read as YAML, anything
//! else as JSON:
//!
//! ```bash
//! uca --registry registry/identity.yaml construct ns:Person:age 42
//! UCA_REGISTRY=registry/identity.yaml uca check
//! ```

pub mod check;
pub mod construct;
pub mod inspect;

use std::path::Path;

use anyhow::{Context, Result};
use uca_schema::DefinitionRegistry;

/// Load the registry named by `--registry` / `UCA_REGISTRY`.
pub fn load_registry(path: Option<&Path>) -> Result<DefinitionRegistry> {
    let path = path.context("no registry given: pass --registry or set UCA_REGISTRY")?;
    let registry = DefinitionRegistry::load(path)
        .with_context(|| format!("failed to load registry {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        definitions = registry.len(),
        "loaded registry"
    );
    Ok(registry)
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}
