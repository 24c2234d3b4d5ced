//! # Mock Proof System
//!
//! A deterministic, transparent proof backend. A "proof" is the SHA-256
//! digest of the canonical proof statement: backend tag, key hash, origin
//! circuit shape, and the flattened public input and output. Verification
//! recomputes the digest.
//!
//! ## Security Notice
//!
//! This provides NO zero-knowledge and NO soundness against a prover who
//! knows the statement. It exercises the composition logic (registries,
//! binders, chain continuity) end to end. [`ProofPolicy`](crate::policy::ProofPolicy)
//! in production mode rejects its proofs.

use serde::Serialize;

use sideload_core::{sha256_digest, CanonicalBytes, FieldElement, ZkResult};

use crate::capability::FeatureSet;
use crate::key::VerificationKey;
use crate::policy::ProofBackend;
use crate::proof::{Proof, ProofMeta, RawProof};
use crate::traits::{Circuit, ProofSystem, ProofVerifier, PublicValue, Synthesizer};

/// Deterministic SHA-256 backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockProofSystem;

impl MockProofSystem {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct Statement<'a> {
    backend: ProofBackend,
    key: FieldElement,
    circuit: &'a str,
    features: FeatureSet,
    max_proofs_verified: u8,
    public_input: &'a [FieldElement],
    public_output: &'a [FieldElement],
}

impl Statement<'_> {
    fn commitment(&self) -> ZkResult<String> {
        let bytes = CanonicalBytes::new(self)?;
        Ok(sha256_digest(&bytes).to_hex())
    }
}

impl ProofVerifier for MockProofSystem {
    fn verify_raw(&self, proof: &RawProof, key: &VerificationKey) -> bool {
        let meta = &proof.meta;
        if meta.backend != ProofBackend::Mock
            || key.backend() != ProofBackend::Mock
            || meta.circuit != key.name()
            || meta.features != key.features()
            || meta.max_proofs_verified != key.max_proofs_verified()
        {
            tracing::debug!(circuit = %meta.circuit, key = %key.name(), "proof origin does not match key");
            return false;
        }
        let statement = Statement {
            backend: ProofBackend::Mock,
            key: key.hash(),
            circuit: &meta.circuit,
            features: meta.features,
            max_proofs_verified: meta.max_proofs_verified,
            public_input: &proof.public_input,
            public_output: &proof.public_output,
        };
        match statement.commitment() {
            Ok(expected) => expected == meta.proof_hex,
            Err(_) => false,
        }
    }

    fn hash(&self, elements: &[FieldElement]) -> FieldElement {
        sideload_crypto::hash_fields(elements)
    }
}

impl ProofSystem for MockProofSystem {
    fn backend(&self) -> ProofBackend {
        ProofBackend::Mock
    }

    fn compile<C: Circuit>(&self, circuit: &C) -> ZkResult<VerificationKey> {
        let descriptor = circuit.descriptor();
        descriptor.validate()?;
        let key = VerificationKey::new(ProofBackend::Mock, descriptor)?;
        tracing::debug!(circuit = %key.name(), hash = %key.hash(), "compiled circuit");
        Ok(key)
    }

    fn prove<C: Circuit>(
        &self,
        circuit: &C,
        input: C::PublicInput,
        witness: C::Witness,
    ) -> ZkResult<Proof<C::PublicInput, C::PublicOutput>> {
        let key = self.compile(circuit)?;
        let cx = Synthesizer::new(key.name(), self, &key);
        let output = circuit.synthesize(&cx, &input, witness)?;

        let public_input = input.to_fields();
        let public_output = output.to_fields();
        let statement = Statement {
            backend: ProofBackend::Mock,
            key: key.hash(),
            circuit: key.name(),
            features: key.features(),
            max_proofs_verified: key.max_proofs_verified(),
            public_input: &public_input,
            public_output: &public_output,
        };
        let proof_hex = statement.commitment()?;
        tracing::debug!(circuit = %key.name(), "proved");

        Ok(Proof::new(
            input,
            output,
            ProofMeta {
                backend: ProofBackend::Mock,
                circuit: key.name().to_string(),
                features: key.features(),
                max_proofs_verified: key.max_proofs_verified(),
                proof_hex,
            },
        ))
    }
}
