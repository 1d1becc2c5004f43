//! # Construct and Reconstruct Subcommands
//!
//! `uca construct` builds an attribute from a JSON value; `uca reconstruct`
//! rebuilds one from a commitment. Both print the result in the form chosen
//! with `--show`.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use uca_attribute::{
    collect_attestable_values, plain_value, AttributeFactory, AttributeInstance, ConstructionInput,
};

/// What to print for a constructed attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Show {
    /// The full instance as JSON.
    #[default]
    Instance,
    /// The canonical commitment and content id.
    Commitment,
    /// Commitments of the disclosable attributes.
    Disclosed,
    /// The plain value tree.
    Plain,
}

/// Arguments for the `uca construct` subcommand.
#[derive(Args, Debug)]
pub struct ConstructArgs {
    /// Identifier of the definition to construct.
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,

    /// JSON value: a scalar, an object keyed by property name, or
    /// `{"attestableValue": "..."}`.
    #[arg(value_name = "VALUE")]
    pub value: String,

    /// Definition version (default: first registered).
    #[arg(long = "def-version")]
    pub version: Option<String>,

    /// Output form.
    #[arg(long, value_enum, default_value_t = Show::Instance)]
    pub show: Show,
}

/// Arguments for the `uca reconstruct` subcommand.
#[derive(Args, Debug)]
pub struct ReconstructArgs {
    /// Identifier of the definition the commitment was issued for.
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,

    /// The commitment string.
    #[arg(value_name = "COMMITMENT")]
    pub commitment: String,

    /// Definition version (default: first registered).
    #[arg(long = "def-version")]
    pub version: Option<String>,

    /// Output form.
    #[arg(long, value_enum, default_value_t = Show::Instance)]
    pub show: Show,
}

/// Execute the construct subcommand.
pub fn run_construct(args: &ConstructArgs, registry_path: Option<&Path>) -> Result<u8> {
    let registry = crate::load_registry(registry_path)?;
    let value: Value = serde_json::from_str(&args.value)
        .or_else(|_| serde_json::from_str(&format!("{:?}", args.value)))
        .with_context(|| format!("VALUE is not JSON: {}", args.value))?;

    let instance = AttributeFactory::new(&registry)
        .construct_json(&args.identifier, &value, args.version.as_deref())
        .with_context(|| format!("failed to construct '{}'", args.identifier))?;

    crate::print_json(&render(&instance, args.show)?)?;
    Ok(0)
}

/// Execute the reconstruct subcommand.
pub fn run_reconstruct(args: &ReconstructArgs, registry_path: Option<&Path>) -> Result<u8> {
    let registry = crate::load_registry(registry_path)?;
    let instance = AttributeFactory::new(&registry)
        .construct(
            &args.identifier,
            ConstructionInput::Commitment(args.commitment.clone()),
            args.version.as_deref(),
        )
        .with_context(|| format!("failed to reconstruct '{}'", args.identifier))?;

    crate::print_json(&render(&instance, args.show)?)?;
    Ok(0)
}

/// Render `instance` in the requested form.
pub fn render(instance: &AttributeInstance, show: Show) -> Result<Value> {
    Ok(match show {
        Show::Instance => serde_json::to_value(instance).context("failed to serialize instance")?,
        Show::Commitment => json!({
            "attestableValue": instance.attestable_value(),
            "id": instance.id(),
        }),
        Show::Disclosed => serde_json::to_value(collect_attestable_values(instance))
            .context("failed to serialize disclosed values")?,
        Show::Plain => plain_value(instance, None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_registry;

    fn construct_args(identifier: &str, value: &str, show: Show) -> ConstructArgs {
        ConstructArgs {
            identifier: identifier.into(),
            value: value.into(),
            version: None,
            show,
        }
    }

    #[test]
    fn construct_number_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let registry = write_registry(dir.path());
        let code = run_construct(
            &construct_args("ns:Person:age", "42", Show::Commitment),
            Some(&registry),
        )
        .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn bare_word_is_taken_as_string() {
        let dir = tempfile::tempdir().unwrap();
        let registry = write_registry(dir.path());
        // "Ann" is not JSON; it is retried as a quoted string and then
        // rejected because age is a Number.
        let err = run_construct(
            &construct_args("ns:Person:age", "Ann", Show::Instance),
            Some(&registry),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("invalid value"));
    }

    #[test]
    fn construct_out_of_range_fails() {
        let dir = tempfile::tempdir().unwrap();
        let registry = write_registry(dir.path());
        let err = run_construct(
            &construct_args("ns:Person:age", "200", Show::Instance),
            Some(&registry),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("failed to construct 'ns:Person:age'"));
    }

    #[test]
    fn render_forms() {
        let dir = tempfile::tempdir().unwrap();
        let registry = crate::load_registry(Some(&write_registry(dir.path()))).unwrap();
        let name = AttributeFactory::new(&registry)
            .construct_json("ns:Person:name", &json!({"first": "Ann", "last": "Lee"}), None)
            .unwrap();

        let instance = render(&name, Show::Instance).unwrap();
        assert_eq!(instance["type"], "Object");
        assert_eq!(instance["value"]["first"]["value"], "Ann");
        assert!(instance.get("timestamp").is_none());

        let commitment = render(&name, Show::Commitment).unwrap();
        assert_eq!(commitment["attestableValue"], name.attestable_value());

        let disclosed = render(&name, Show::Disclosed).unwrap();
        assert_eq!(disclosed[0]["identifier"], "ns:Person:name");

        assert_eq!(
            render(&name, Show::Plain).unwrap(),
            json!({"first": "Ann", "last": "Lee"})
        );
    }

    #[test]
    fn reconstruct_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_registry(dir.path());
        let registry = crate::load_registry(Some(&path)).unwrap();
        let age = AttributeFactory::new(&registry)
            .construct_json("ns:Person:age", &json!(42), None)
            .unwrap();
        let args = ReconstructArgs {
            identifier: "ns:Person:age".into(),
            commitment: age.attestable_value(),
            version: None,
            show: Show::Commitment,
        };
        assert_eq!(run_reconstruct(&args, Some(&path)).unwrap(), 0);

        let bad = ReconstructArgs {
            commitment: "urn:age:salt".into(),
            ..args
        };
        assert!(run_reconstruct(&bad, Some(&path)).is_err());
    }
}
