//! # Arithmetic Circuits
//!
//! [`MultiplyCircuit`] proves a product of two private factors.
//! [`AddCircuit`] adds its public input to the output of a sideloaded
//! `multiply` proof. The key of that proof is checked against an
//! [`Allowlist`] holding the single trusted hash, and a proof whose output
//! is zero is the base case: it is not verified.

use sideload_core::{FieldElement, ZkResult};
use sideload_zkp::{
    Allowlist, Check, Circuit, CircuitDescriptor, DynamicProof, DynamicProofBinder, FeatureSet,
    KeyRegistry, Synthesizer, VerificationKey,
};

/// Proves `a * b` for private `a`, `b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiplyCircuit;

impl Circuit for MultiplyCircuit {
    type PublicInput = ();
    type PublicOutput = FieldElement;
    type Witness = (FieldElement, FieldElement);

    fn descriptor(&self) -> CircuitDescriptor {
        CircuitDescriptor::new("multiply", FeatureSet::NONE, 0)
    }

    fn synthesize(
        &self,
        _cx: &Synthesizer<'_>,
        _input: &(),
        (a, b): (FieldElement, FieldElement),
    ) -> ZkResult<FieldElement> {
        Ok(a * b)
    }
}

/// Private input of [`AddCircuit`].
#[derive(Debug, Clone)]
pub struct AddWitness {
    pub proof: DynamicProof<(), FieldElement>,
    pub key: VerificationKey,
}

/// Adds the public input to a sideloaded product.
#[derive(Debug, Clone)]
pub struct AddCircuit {
    allowlist: Allowlist,
    binder: DynamicProofBinder,
}

impl AddCircuit {
    pub fn new(allowlist: Allowlist, binder: DynamicProofBinder) -> Self {
        Self { allowlist, binder }
    }

    pub fn binder(&self) -> &DynamicProofBinder {
        &self.binder
    }
}

impl Circuit for AddCircuit {
    type PublicInput = FieldElement;
    type PublicOutput = FieldElement;
    type Witness = AddWitness;

    fn descriptor(&self) -> CircuitDescriptor {
        CircuitDescriptor::new("add", FeatureSet::NONE, 1)
            .accepting(*self.binder.profile())
            .with_constants(vec![self.allowlist.trusted_hash()])
    }

    fn synthesize(
        &self,
        cx: &Synthesizer<'_>,
        input: &FieldElement,
        witness: AddWitness,
    ) -> ZkResult<FieldElement> {
        self.allowlist.ensure_trusted(&witness.key, &())?;
        let check = Check::skip_if_output_is(&witness.proof, &FieldElement::ZERO, &witness.key);
        self.binder.verify_conditional(cx, &witness.proof, check)?;
        Ok(*input + *witness.proof.public_output())
    }
}
