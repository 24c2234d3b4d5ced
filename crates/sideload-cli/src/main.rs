//! # sideload CLI entry point
//!
//! Parses command-line arguments, installs logging, resolves the proof
//! policy, and dispatches to the flow handlers.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use sideload_cli::allowlist::{run_allowlist, AllowlistArgs, AllowlistReport};
use sideload_cli::registry::{run_registry, RegistryArgs, RegistryReport};
use sideload_cli::{run_all, FullReport};
use sideload_zkp::{PolicyMode, ProofPolicy};

/// Sideloaded recursive proofs.
///
/// Compiles, proves, and verifies circuits whose sub-proof keys are only
/// known at proving time, trusted either through a single allowlisted hash
/// or through a Merkle registry carried by a recursive chain.
#[derive(Parser, Debug)]
#[command(name = "sideload", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print the final report as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Proof policy (`production` or `development`). Defaults to
    /// SIDELOAD_PROOF_POLICY, then to the build profile.
    #[arg(long, global = true)]
    policy: Option<PolicyMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Single trusted key: add(5, dummy), multiply(3, 3), add(4, product).
    Allowlist(AllowlistArgs),

    /// Merkle registry on a recursive chain: two inserts, then validate.
    Registry(RegistryArgs),

    /// Run both flows with default arguments.
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

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

    let policy = cli
        .policy
        .map(ProofPolicy::new)
        .unwrap_or_else(ProofPolicy::from_environment);
    tracing::debug!(mode = ?policy.mode(), "proof policy");

    let result = match &cli.command {
        Commands::Allowlist(args) => {
            run_allowlist(args, policy).and_then(|r| emit(&r, cli.json, render_allowlist))
        }
        Commands::Registry(args) => {
            run_registry(args, policy).and_then(|r| emit(&r, cli.json, render_registry))
        }
        Commands::All => run_all(policy).and_then(|r| emit(&r, cli.json, render_all)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn emit<T: Serialize>(report: &T, json: bool, render: fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render(report));
    }
    Ok(())
}

fn render_allowlist(r: &AllowlistReport) -> String {
    format!(
        "allowlist\n  multiply key  {}\n  add key       {}\n  base case     {}\n  product       {}\n  total         {}\n  verified      {}\n",
        r.multiply_key, r.add_key, r.base_output, r.product, r.total, r.verified
    )
}

fn render_registry(r: &RegistryReport) -> String {
    format!(
        "registry (depth {})\n  program key   {}\n  program2 key  {}\n  chain key     {}\n  genesis       {}\n  R1            {}\n  R2            {}\n  stale witness {}\n  final state   {}\n  verified      {}\n",
        r.depth,
        r.program_key,
        r.program2_key,
        r.chain_key,
        r.genesis,
        r.r1,
        r.r2,
        if r.stale_witness_rejected { "rejected" } else { "accepted" },
        r.final_state,
        r.verified
    )
}

fn render_all(r: &FullReport) -> String {
    format!("{}{}", render_allowlist(&r.allowlist), render_registry(&r.registry))
}
