//! # Recursive Chain State
//!
//! [`ChainState`] is the public record threaded through every step of a
//! recursive proof chain: the key-registry root as of that step and the
//! value accumulated by all prior steps.
//!
//! ## Transitions
//!
//! ```text
//!            genesis {R0, V0}
//!                  │
//!   registry_update(key, empty-slot witness)   ──▶  {R', V}
//!   validate(key, membership, dynamic proof)   ──▶  {R,  proof.output}
//! ```
//!
//! Both transitions are pure functions of the input state and their
//! witnesses. The [`ChainCircuit`](crate::circuit::ChainCircuit) runs them
//! inside proving, after checking the step's [`ChainLink`] to its
//! predecessor.
//!
//! ## Invariants
//!
//! - `registry_root` only changes through `registry_update`, and only by
//!   filling a slot that was `EMPTY` under the previous root.
//! - `value` only changes through `validate`, and only to the output of a
//!   dynamic proof whose public input was the previous `value` and whose
//!   key is a member of the registry under the current root.

use std::fmt;

use serde::{Deserialize, Serialize};

use sideload_core::{FieldElement, ZkError, ZkResult};
use sideload_crypto::MerkleWitness;
use sideload_zkp::{
    Check, DynamicProof, DynamicProofBinder, KeyRegistry, MerkleRegistry, Proof, ProofVerifier,
    PublicValue, VerificationKey,
};

/// Proof produced by one chain step.
pub type ChainProof = Proof<ChainState, ChainState>;

// ─── State ───────────────────────────────────────────────────────────

/// `{ registry_root, value }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainState {
    pub registry_root: FieldElement,
    pub value: FieldElement,
}

impl PublicValue for ChainState {
    fn to_fields(&self) -> Vec<FieldElement> {
        vec![self.registry_root, self.value]
    }
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{root: {}, value: {}}}", self.registry_root, self.value)
    }
}

impl ChainState {
    /// Caller-supplied starting state. Needs no proof.
    pub fn genesis(registry_root: FieldElement, value: FieldElement) -> Self {
        Self {
            registry_root,
            value,
        }
    }

    /// The registry as of this state.
    pub fn registry(&self, depth: usize) -> MerkleRegistry {
        MerkleRegistry::at(self.registry_root, depth)
    }

    /// Register `key` in the empty slot `witness` points at.
    ///
    /// # Errors
    ///
    /// `SlotOccupied` if the slot is not empty under `registry_root`,
    /// `Merkle` if the witness depth is not `depth`.
    pub fn registry_update(
        &self,
        depth: usize,
        key: &VerificationKey,
        witness: &MerkleWitness,
    ) -> ZkResult<ChainState> {
        let mut registry = self.registry(depth);
        let registry_root = registry.insert(key, witness)?;
        Ok(ChainState {
            registry_root,
            value: self.value,
        })
    }

    /// Advance `value` by a sideloaded proof from a registered circuit.
    ///
    /// Trust is established first, then continuity of the proof's input,
    /// then the proof itself. With `base_case = Some(identity)` a step whose
    /// input `value` is `identity` skips verification and leaves `value`
    /// unchanged; with `None` the proof is always verified.
    ///
    /// # Errors
    ///
    /// `UntrustedKey` if `key` is not a member under `registry_root`,
    /// `ContinuityBroken` if the proof's input is not `value`,
    /// `ProofInvalid` (or `PolicyRejected`) from the binder.
    #[allow(clippy::too_many_arguments)]
    pub fn validate(
        &self,
        depth: usize,
        verifier: &dyn ProofVerifier,
        binder: &DynamicProofBinder,
        key: &VerificationKey,
        membership: &MerkleWitness,
        proof: &DynamicProof<FieldElement, FieldElement>,
        base_case: Option<FieldElement>,
    ) -> ZkResult<ChainState> {
        self.registry(depth).ensure_trusted(key, membership)?;

        if *proof.public_input() != self.value {
            return Err(ZkError::ContinuityBroken {
                expected: self.value.to_string(),
                actual: proof.public_input().to_string(),
            });
        }

        let check = match base_case {
            Some(identity) => Check::skip_if_state_is(&self.value, &identity, key),
            None => Check::require(key),
        };
        binder.verify_conditional(verifier, proof, check)?;

        // An unverified proof must not move the value.
        let value = if check.is_skip() {
            self.value
        } else {
            *proof.public_output()
        };
        Ok(ChainState {
            registry_root: self.registry_root,
            value,
        })
    }
}

// ─── Links ───────────────────────────────────────────────────────────

/// How a step connects to what came before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChainLink {
    /// First step. The input must be the chain's genesis state.
    Genesis,
    /// A verified proof of the previous step.
    Step(Box<ChainProof>),
}

impl ChainLink {
    pub fn step(proof: ChainProof) -> Self {
        ChainLink::Step(Box::new(proof))
    }

    /// Check that `input` is a legitimate starting point for a step.
    ///
    /// # Errors
    ///
    /// `ContinuityBroken` if `input` is not the genesis state (for
    /// `Genesis`) or not the predecessor's output (for `Step`);
    /// `ProofInvalid` if the predecessor does not verify against
    /// `chain_key`.
    pub fn check(
        &self,
        verifier: &dyn ProofVerifier,
        chain_key: &VerificationKey,
        genesis: &ChainState,
        input: &ChainState,
    ) -> ZkResult<()> {
        match self {
            ChainLink::Genesis => {
                if input != genesis {
                    return Err(ZkError::ContinuityBroken {
                        expected: genesis.to_string(),
                        actual: input.to_string(),
                    });
                }
            }
            ChainLink::Step(prev) => {
                if !verifier.verify_raw(&prev.to_raw(), chain_key) {
                    tracing::warn!(circuit = %prev.meta().circuit, "predecessor proof rejected");
                    return Err(ZkError::ProofInvalid(format!(
                        "predecessor from circuit `{}` does not verify against the chain key {}",
                        prev.meta().circuit,
                        chain_key.hash()
                    )));
                }
                if prev.public_output() != input {
                    return Err(ZkError::ContinuityBroken {
                        expected: input.to_string(),
                        actual: prev.public_output().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
