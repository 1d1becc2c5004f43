//! # Parse and Resolve Subcommands
//!
//! Read-only inspection: `uca parse` splits a commitment without touching
//! the registry; `uca resolve` shows how a definition resolves.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::{json, Value};

use uca_attribute::{parse_commitment, CommitmentComponent};
use uca_schema::{resolve_concrete_type, DefinitionRegistry};

/// Arguments for the `uca parse` subcommand.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// The commitment string.
    #[arg(value_name = "COMMITMENT")]
    pub commitment: String,
}

/// Arguments for the `uca resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Identifier of the definition.
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,

    /// Definition version (default: first registered).
    #[arg(long = "def-version")]
    pub version: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SegmentView<'a> {
    property_name: &'a str,
    salt: &'a str,
    value: &'a str,
}

/// Execute the parse subcommand.
pub fn run_parse(args: &ParseArgs) -> Result<u8> {
    let components = parse_commitment(&args.commitment).context("failed to parse commitment")?;
    crate::print_json(&segments_json(&components)?)?;
    Ok(0)
}

fn segments_json(components: &[CommitmentComponent]) -> Result<Value> {
    let views: Vec<SegmentView<'_>> = components
        .iter()
        .map(|c| SegmentView {
            property_name: &c.property_name,
            salt: &c.salt,
            value: &c.value,
        })
        .collect();
    serde_json::to_value(views).context("failed to serialize segments")
}

/// Execute the resolve subcommand.
pub fn run_resolve(args: &ResolveArgs, registry_path: Option<&Path>) -> Result<u8> {
    let registry = crate::load_registry(registry_path)?;
    let report = describe(&registry, &args.identifier, args.version.as_deref())?;
    crate::print_json(&report)?;
    Ok(0)
}

/// Resolution summary of one definition.
pub fn describe(
    registry: &DefinitionRegistry,
    identifier: &str,
    version: Option<&str>,
) -> Result<Value> {
    let definition = registry.lookup(identifier, version)?;
    let resolved = resolve_concrete_type(registry, definition)
        .with_context(|| format!("failed to resolve '{identifier}'"))?;
    let claim_paths = registry.all_claim_paths(identifier, version)?;
    Ok(json!({
        "identifier": definition.identifier,
        "version": definition.version,
        "type": resolved.leaf_type(),
        "resolvedFrom": resolved.terminal.identifier,
        "constraints": resolved.constraints_for(definition),
        "credentialItem": definition.credential_item,
        "attestable": definition.attestable,
        "attestableName": definition.identifier.attestable_name(),
        "claimPaths": claim_paths,
    }))
}
