//! # sideload-cli — Proof Composition Driver
//!
//! Sequences compile, prove, and verify calls for the two trust
//! strategies. The libraries below it decide what is valid; this crate only
//! decides what happens in which order, and which independent proofs run
//! in parallel.
//!
//! ## Subcommands
//!
//! - `allowlist`: one trusted key baked into the `add` circuit
//! - `registry`: keys registered in a Merkle tree carried by a recursive chain
//! - `all`: both, in that order
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; the flows are library functions
//!   so they can be tested without a process.
//! - Errors are `anyhow` with context; library errors pass through intact.

pub mod allowlist;
pub mod registry;

use anyhow::Result;
use serde::Serialize;

use sideload_zkp::ProofPolicy;

use crate::allowlist::{run_allowlist, AllowlistArgs, AllowlistReport};
use crate::registry::{run_registry, RegistryArgs, RegistryReport};

/// Outcome of `sideload all`.
#[derive(Debug, Clone, Serialize)]
pub struct FullReport {
    pub allowlist: AllowlistReport,
    pub registry: RegistryReport,
}

/// Run both flows with default arguments.
pub fn run_all(policy: ProofPolicy) -> Result<FullReport> {
    Ok(FullReport {
        allowlist: run_allowlist(&AllowlistArgs::default(), policy)?,
        registry: run_registry(&RegistryArgs::default(), policy)?,
    })
}
