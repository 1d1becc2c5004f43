//! # uca CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use uca_cli::check::{run_check, CheckArgs};
use uca_cli::construct::{run_construct, run_reconstruct, ConstructArgs, ReconstructArgs};
use uca_cli::inspect::{run_parse, run_resolve, ParseArgs, ResolveArgs};

/// Collectable attributes CLI.
///
/// Builds salted, hash-committed attribute values against a definition
/// registry, rebuilds them from commitments, and inspects definitions.
#[derive(Parser, Debug)]
#[command(name = "uca", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the definition registry (JSON or YAML).
    #[arg(long, global = true, env = "UCA_REGISTRY")]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Construct an attribute from a raw or nested JSON value.
    Construct(ConstructArgs),

    /// Rebuild an attribute from a previously issued commitment.
    Reconstruct(ReconstructArgs),

    /// Split a commitment into its segments.
    Parse(ParseArgs),

    /// Show how a definition resolves, with its claim paths.
    Resolve(ResolveArgs),

    /// Check the registry for configuration defects.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "uca CLI starting");

    let registry = cli.registry.as_deref();
    let result = match cli.command {
        Commands::Construct(args) => run_construct(&args, registry),
        Commands::Reconstruct(args) => run_reconstruct(&args, registry),
        Commands::Parse(args) => run_parse(&args),
        Commands::Resolve(args) => run_resolve(&args, registry),
        Commands::Check(args) => run_check(&args, registry),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
