//! # Program Circuits
//!
//! One-step programs over a single field element. Each program is its own
//! circuit with its own key. The chain circuit validates their proofs
//! after finding the key in its Merkle registry.

use serde::{Deserialize, Serialize};

use sideload_core::{FieldElement, ZkResult};
use sideload_zkp::{Circuit, CircuitDescriptor, FeatureSet, Synthesizer};

/// What a program computes from its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "constant")]
pub enum ProgramOp {
    AddConstant(u64),
    MulConstant(u64),
    Square,
}

impl ProgramOp {
    pub fn apply(&self, x: FieldElement) -> FieldElement {
        match *self {
            ProgramOp::AddConstant(c) => x + FieldElement::new(c),
            ProgramOp::MulConstant(c) => x * FieldElement::new(c),
            ProgramOp::Square => x * x,
        }
    }

    /// Descriptor constants: an op tag (0 add, 1 mul, 2 square) followed by
    /// the operand, so programs differing only in op get distinct keys.
    fn constants(&self) -> Vec<FieldElement> {
        match *self {
            ProgramOp::AddConstant(c) => vec![FieldElement::ZERO, FieldElement::new(c)],
            ProgramOp::MulConstant(c) => vec![FieldElement::ONE, FieldElement::new(c)],
            ProgramOp::Square => vec![FieldElement::new(2)],
        }
    }
}

/// A named field program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCircuit {
    name: String,
    op: ProgramOp,
    features: FeatureSet,
}

impl ProgramCircuit {
    pub fn new(name: impl Into<String>, op: ProgramOp, features: FeatureSet) -> Self {
        Self {
            name: name.into(),
            op,
            features,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn op(&self) -> ProgramOp {
        self.op
    }
}

impl Circuit for ProgramCircuit {
    type PublicInput = FieldElement;
    type PublicOutput = FieldElement;
    type Witness = ();

    fn descriptor(&self) -> CircuitDescriptor {
        CircuitDescriptor::new(self.name.clone(), self.features, 0)
            .with_constants(self.op.constants())
    }

    fn synthesize(
        &self,
        _cx: &Synthesizer<'_>,
        input: &FieldElement,
        _witness: (),
    ) -> ZkResult<FieldElement> {
        Ok(self.op.apply(*input))
    }
}
