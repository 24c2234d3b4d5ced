//! # Proofs
//!
//! [`Proof<In, Out>`] asserts "circuit X, given public input `In`,
//! produced `Out`". It is immutable once built: fields are private and
//! only a backend's `prove` (or [`Proof::dummy`]) constructs one.
//!
//! [`RawProof`] is the same proof with its public values flattened into
//! field elements. Backends verify raw proofs, which keeps
//! [`ProofVerifier`](crate::traits::ProofVerifier) object-safe.

use serde::{Deserialize, Serialize};

use sideload_core::FieldElement;

use crate::capability::FeatureSet;
use crate::policy::ProofBackend;
use crate::traits::PublicValue;

/// Circuit name carried by placeholder proofs.
pub const DUMMY_CIRCUIT: &str = "dummy";

/// Origin and payload of a proof, independent of its public values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofMeta {
    pub backend: ProofBackend,
    /// Name of the circuit that produced the proof.
    pub circuit: String,
    /// Features of the originating circuit.
    pub features: FeatureSet,
    pub max_proofs_verified: u8,
    /// Backend proof bytes, hex encoded. Empty for dummies.
    pub proof_hex: String,
}

/// A proof over typed public values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof<In, Out> {
    public_input: In,
    public_output: Out,
    meta: ProofMeta,
}

impl<In: PublicValue, Out: PublicValue> Proof<In, Out> {
    pub(crate) fn new(public_input: In, public_output: Out, meta: ProofMeta) -> Self {
        Self {
            public_input,
            public_output,
            meta,
        }
    }

    /// Structurally well-formed placeholder that verifies against no key.
    ///
    /// Base cases pass one of these together with a `Check` that skips
    /// verification.
    pub fn dummy(public_input: In, public_output: Out, max_proofs_verified: u8) -> Self {
        Self::new(
            public_input,
            public_output,
            ProofMeta {
                backend: ProofBackend::Mock,
                circuit: DUMMY_CIRCUIT.to_string(),
                features: FeatureSet::NONE,
                max_proofs_verified,
                proof_hex: String::new(),
            },
        )
    }

    pub fn public_input(&self) -> &In {
        &self.public_input
    }

    pub fn public_output(&self) -> &Out {
        &self.public_output
    }

    pub fn meta(&self) -> &ProofMeta {
        &self.meta
    }

    pub fn features(&self) -> FeatureSet {
        self.meta.features
    }

    pub fn max_proofs_verified(&self) -> u8 {
        self.meta.max_proofs_verified
    }

    pub fn is_dummy(&self) -> bool {
        self.meta.proof_hex.is_empty()
    }

    /// Flatten public values for backend verification.
    pub fn to_raw(&self) -> RawProof {
        RawProof {
            public_input: self.public_input.to_fields(),
            public_output: self.public_output.to_fields(),
            meta: self.meta.clone(),
        }
    }
}

/// A proof with public values flattened into field elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProof {
    pub public_input: Vec<FieldElement>,
    pub public_output: Vec<FieldElement>,
    pub meta: ProofMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dummy_has_no_payload() {
        let p: Proof<(), FieldElement> = Proof::dummy((), FieldElement::ZERO, 0);
        assert!(p.is_dummy());
        assert_eq!(p.meta().circuit, DUMMY_CIRCUIT);
        assert_eq!(p.features(), FeatureSet::NONE);
        assert_eq!(*p.public_output(), FieldElement::ZERO);
    }

    #[test]
    fn raw_flattens_public_values() {
        let p: Proof<FieldElement, FieldElement> =
            Proof::dummy(FieldElement::new(4), FieldElement::new(9), 1);
        let raw = p.to_raw();
        assert_eq!(raw.public_input, vec![FieldElement::new(4)]);
        assert_eq!(raw.public_output, vec![FieldElement::new(9)]);
        assert_eq!(raw.meta.max_proofs_verified, 1);
    }

    #[test]
    fn serde_round_trip() {
        let p: Proof<(), FieldElement> = Proof::dummy((), FieldElement::new(7), 0);
        let json = serde_json::to_string(&p).unwrap();
        let back: Proof<(), FieldElement> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
