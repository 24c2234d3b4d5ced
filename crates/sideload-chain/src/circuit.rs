//! # Chain Circuit
//!
//! The self-recursive circuit that turns [`ChainState`] transitions into
//! proofs. Every step carries a [`ChainLink`]: the first step names the
//! genesis state baked into the circuit, every later one carries the
//! previous step's proof, checked against this circuit's own key.
//!
//! The circuit verifies at most two proofs per step (the predecessor and
//! one sideloaded program proof), and accepts sideloaded proofs from any
//! circuit inside its binder's capability profile. Changing the genesis,
//! the registry depth, or the profile changes the chain key.

use sideload_core::{FieldElement, ZkResult};
use sideload_crypto::MerkleWitness;
use sideload_zkp::{
    Circuit, CircuitDescriptor, DynamicProof, DynamicProofBinder, FeatureSet, Synthesizer,
    VerificationKey,
};

use crate::state::{ChainLink, ChainState};

/// Circuit name of every chain step.
pub const CHAIN_CIRCUIT: &str = "recursive-chain";

/// Private input of one chain step.
#[derive(Debug, Clone)]
pub enum ChainStep {
    /// Register `key` in the empty slot `witness` points at.
    RegistryUpdate {
        link: ChainLink,
        key: VerificationKey,
        witness: MerkleWitness,
    },
    /// Advance the value by a sideloaded proof from a registered circuit.
    Validate {
        link: ChainLink,
        key: VerificationKey,
        membership: MerkleWitness,
        proof: DynamicProof<FieldElement, FieldElement>,
    },
}

impl ChainStep {
    fn link(&self) -> &ChainLink {
        match self {
            ChainStep::RegistryUpdate { link, .. } | ChainStep::Validate { link, .. } => link,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ChainStep::RegistryUpdate { .. } => "registry_update",
            ChainStep::Validate { .. } => "validate",
        }
    }
}

/// Recursive chain over a registry of the given depth.
#[derive(Debug, Clone)]
pub struct ChainCircuit {
    genesis: ChainState,
    depth: usize,
    binder: DynamicProofBinder,
    base_case: Option<FieldElement>,
}

impl ChainCircuit {
    pub fn new(genesis: ChainState, depth: usize, binder: DynamicProofBinder) -> Self {
        Self {
            genesis,
            depth,
            binder,
            base_case: None,
        }
    }

    /// Let a Validate step whose input value is `identity` skip verifying
    /// its sideloaded proof. Such a step leaves the value at `identity`.
    pub fn with_base_case(mut self, identity: FieldElement) -> Self {
        self.base_case = Some(identity);
        self
    }

    pub fn genesis(&self) -> ChainState {
        self.genesis
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn binder(&self) -> &DynamicProofBinder {
        &self.binder
    }
}

impl Circuit for ChainCircuit {
    type PublicInput = ChainState;
    type PublicOutput = ChainState;
    type Witness = ChainStep;

    fn descriptor(&self) -> CircuitDescriptor {
        let mut constants = vec![
            self.genesis.registry_root,
            self.genesis.value,
            FieldElement::new(self.depth as u64),
        ];
        constants.extend(self.base_case);
        CircuitDescriptor::new(CHAIN_CIRCUIT, FeatureSet::NONE, 2)
            .accepting(*self.binder.profile())
            .with_constants(constants)
    }

    fn synthesize(
        &self,
        cx: &Synthesizer<'_>,
        input: &ChainState,
        step: ChainStep,
    ) -> ZkResult<ChainState> {
        if let ChainLink::Step(prev) = step.link() {
            self.binder.policy().validate(prev.meta().backend)?;
        }
        step.link().check(cx, cx.self_key(), &self.genesis, input)?;

        let kind = step.kind();
        let output = match step {
            ChainStep::RegistryUpdate { key, witness, .. } => {
                input.registry_update(self.depth, &key, &witness)?
            }
            ChainStep::Validate {
                key,
                membership,
                proof,
                ..
            } => input.validate(
                self.depth,
                cx,
                &self.binder,
                &key,
                &membership,
                &proof,
                self.base_case,
            )?,
        };
        tracing::debug!(step = kind, from = %input, to = %output, "chain step");
        Ok(output)
    }
}
