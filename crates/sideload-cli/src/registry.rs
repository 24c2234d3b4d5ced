//! # Registry Subcommand
//!
//! Runs the Merkle-registry flow on a recursive chain:
//!
//! 1. compile `program` and `program2` in parallel; their profile union
//!    fixes the chain circuit;
//! 2. register `program` at index 1 (root R1), then `program2` at index 2
//!    (witness recomputed against R1, root R2);
//! 3. attempt a Validate step with the index-1 witness taken under R1 and
//!    confirm it is rejected as untrusted;
//! 4. validate a `program` proof with the index-1 witness recomputed
//!    under R2.

use anyhow::{bail, ensure, Context, Result};
use clap::Args;
use serde::Serialize;

use sideload_chain::{ChainCircuit, ChainLink, ChainState, ChainStep, ProgramCircuit, ProgramOp};
use sideload_core::{FieldElement, ZkError};
use sideload_crypto::{MerkleTree, REGISTRY_DEPTH};
use sideload_zkp::{
    CapabilityProfile, Circuit, DynamicProofBinder, FeatureSet, MockProofSystem, ProofPolicy,
    ProofSystem,
};

/// Slot of the first registered program.
pub const PROGRAM_INDEX: u64 = 1;
/// Slot of the second registered program.
pub const PROGRAM2_INDEX: u64 = 2;

/// Arguments for `sideload registry`.
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Depth of the registry tree (1..=64).
    #[arg(long, default_value_t = REGISTRY_DEPTH)]
    pub depth: usize,

    /// Value of the genesis state.
    #[arg(long, default_value_t = 5)]
    pub value: u64,
}

impl Default for RegistryArgs {
    fn default() -> Self {
        Self {
            depth: REGISTRY_DEPTH,
            value: 5,
        }
    }
}

/// Outcome of the registry flow.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryReport {
    pub depth: usize,
    pub program_key: FieldElement,
    pub program2_key: FieldElement,
    pub chain_key: FieldElement,
    pub genesis: ChainState,
    /// Root after registering `program`.
    pub r1: FieldElement,
    /// Root after registering `program2`.
    pub r2: FieldElement,
    /// Whether the index-1 witness taken under R1 was refused under R2.
    pub stale_witness_rejected: bool,
    pub final_state: ChainState,
    /// Whether the final chain proof verifies against `chain_key`.
    pub verified: bool,
}

/// The two registered programs.
pub fn programs() -> (ProgramCircuit, ProgramCircuit) {
    (
        ProgramCircuit::new("program", ProgramOp::AddConstant(1), FeatureSet::NONE),
        ProgramCircuit::new(
            "program2",
            ProgramOp::Square,
            FeatureSet {
                range_check0: true,
                ..FeatureSet::NONE
            },
        ),
    )
}

/// Execute the registry flow.
pub fn run_registry(args: &RegistryArgs, policy: ProofPolicy) -> Result<RegistryReport> {
    let backend = MockProofSystem::new();
    let (program, program2) = programs();

    let (program_vk, program2_vk) = rayon::join(
        || backend.compile(&program),
        || backend.compile(&program2),
    );
    let program_vk = program_vk.context("compiling program")?;
    let program2_vk = program2_vk.context("compiling program2")?;

    let profile = CapabilityProfile::compute([&program.descriptor(), &program2.descriptor()]);
    let mut tree = MerkleTree::new(args.depth).context("creating registry tree")?;
    let genesis = ChainState::genesis(tree.root(), FieldElement::new(args.value));
    let chain = ChainCircuit::new(
        genesis,
        args.depth,
        DynamicProofBinder::new(profile, policy),
    );
    let chain_vk = backend.compile(&chain).context("compiling chain")?;
    tracing::info!(
        program = %program_vk.hash(),
        program2 = %program2_vk.hash(),
        chain = %chain_vk.hash(),
        "compiled"
    );

    let step1 = backend
        .prove(
            &chain,
            genesis,
            ChainStep::RegistryUpdate {
                link: ChainLink::Genesis,
                key: program_vk.clone(),
                witness: tree.witness(PROGRAM_INDEX)?,
            },
        )
        .context("registering program")?;
    let r1 = tree.insert(PROGRAM_INDEX, program_vk.hash())?;
    ensure!(
        step1.public_output().registry_root == r1,
        "chain root diverged from the registry tree after first insert"
    );
    tracing::info!(root = %r1, index = PROGRAM_INDEX, "registered program");
    let stale = tree.witness(PROGRAM_INDEX)?;

    let after_step1 = *step1.public_output();
    let step2 = backend
        .prove(
            &chain,
            after_step1,
            ChainStep::RegistryUpdate {
                link: ChainLink::step(step1),
                key: program2_vk.clone(),
                witness: tree.witness(PROGRAM2_INDEX)?,
            },
        )
        .context("registering program2")?;
    let r2 = tree.insert(PROGRAM2_INDEX, program2_vk.hash())?;
    ensure!(
        step2.public_output().registry_root == r2,
        "chain root diverged from the registry tree after second insert"
    );
    tracing::info!(root = %r2, index = PROGRAM2_INDEX, "registered program2");

    let state = *step2.public_output();
    let sub = backend
        .prove(&program, state.value, ())
        .context("proving program")?;
    let sub = chain.binder().bind(sub).context("binding program proof")?;

    let stale_attempt = backend.prove(
        &chain,
        state,
        ChainStep::Validate {
            link: ChainLink::step(step2.clone()),
            key: program_vk.clone(),
            membership: stale,
            proof: sub.clone(),
        },
    );
    let stale_witness_rejected = match stale_attempt {
        Err(ZkError::UntrustedKey { .. }) => true,
        Err(other) => return Err(other).context("validating with stale witness"),
        Ok(_) => bail!("stale witness was accepted under the current root"),
    };
    tracing::info!("stale witness rejected");

    let last = backend
        .prove(
            &chain,
            state,
            ChainStep::Validate {
                link: ChainLink::step(step2),
                key: program_vk.clone(),
                membership: tree.witness(PROGRAM_INDEX)?,
                proof: sub,
            },
        )
        .context("validating program proof")?;
    let verified = backend.verify(&last, &chain_vk);
    ensure!(verified, "final chain proof does not verify");
    tracing::info!(state = %last.public_output(), "validated");

    Ok(RegistryReport {
        depth: args.depth,
        program_key: program_vk.hash(),
        program2_key: program2_vk.hash(),
        chain_key: chain_vk.hash(),
        genesis,
        r1,
        r2,
        stale_witness_rejected,
        final_state: *last.public_output(),
        verified,
    })
}
