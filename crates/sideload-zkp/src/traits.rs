//! # Proof System and Circuit Traits (Sealed Backend)
//!
//! The core only ever talks to the proof system through four operations:
//! `compile`, `prove`, `verify`, and `hash`. Everything else
//! (arithmetization, commitments, constraint solving) stays behind
//! [`ProofSystem`].
//!
//! ## Sealed Trait
//!
//! `ProofSystem` is sealed: only backends defined in this crate can exist.
//! An externally injected backend could accept forged sub-proofs, which
//! would bypass every registry check upstream.
//!
//! ## Circuits
//!
//! A [`Circuit`] declares its public input/output types, a private
//! witness, and a [`CircuitDescriptor`] (name, feature usage, recursion
//! width, and, for dynamic verifiers, the accepted capability profile). The
//! descriptor is what gets compiled into a verification key.
//! [`Circuit::synthesize`] runs the circuit's assertions against a
//! [`Synthesizer`], which is how a circuit verifies sub-proofs.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use sideload_core::{FieldElement, ZkError, ZkResult};

use crate::capability::{CapabilityProfile, FeatureSet};
use crate::key::VerificationKey;
use crate::policy::ProofBackend;
use crate::proof::{Proof, RawProof};

/// Largest number of sub-proofs a single circuit may verify.
pub const MAX_PROOFS_VERIFIED: u8 = 2;

/// A value that can sit in a proof's public input or output.
pub trait PublicValue:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync
{
    /// Flatten into field elements, in a fixed order.
    fn to_fields(&self) -> Vec<FieldElement>;
}

impl PublicValue for () {
    fn to_fields(&self) -> Vec<FieldElement> {
        Vec::new()
    }
}

impl PublicValue for FieldElement {
    fn to_fields(&self) -> Vec<FieldElement> {
        vec![*self]
    }
}

/// Compile-time shape of a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitDescriptor {
    /// Circuit identifier.
    pub name: String,
    /// Optional gates the circuit uses.
    pub features: FeatureSet,
    /// How many proofs the circuit verifies recursively (0..=2).
    pub max_proofs_verified: u8,
    /// For circuits holding a dynamic proof binder: the profile every
    /// sideloaded sub-proof must fit inside.
    pub accepts: Option<CapabilityProfile>,
    /// Values fixed into the circuit at compile time (trusted key hashes,
    /// genesis states). They are part of the key.
    pub constants: Vec<FieldElement>,
}

impl CircuitDescriptor {
    pub fn new(name: impl Into<String>, features: FeatureSet, max_proofs_verified: u8) -> Self {
        Self {
            name: name.into(),
            features,
            max_proofs_verified,
            accepts: None,
            constants: Vec::new(),
        }
    }

    /// Bake `constants` into the circuit.
    pub fn with_constants(mut self, constants: Vec<FieldElement>) -> Self {
        self.constants = constants;
        self
    }

    /// Declare the capability profile of sideloaded sub-proofs.
    pub fn accepting(mut self, profile: CapabilityProfile) -> Self {
        self.accepts = Some(profile);
        self
    }

    /// Structural checks applied by every backend's `compile`.
    pub fn validate(&self) -> ZkResult<()> {
        if self.name.trim().is_empty() {
            return Err(ZkError::CompilationError {
                circuit: self.name.clone(),
                reason: "circuit name must not be empty".into(),
            });
        }
        if self.max_proofs_verified > MAX_PROOFS_VERIFIED {
            return Err(ZkError::CompilationError {
                circuit: self.name.clone(),
                reason: format!(
                    "verifies {} proofs, at most {MAX_PROOFS_VERIFIED} supported",
                    self.max_proofs_verified
                ),
            });
        }
        if let Some(profile) = &self.accepts {
            if profile.max_proofs_verified > MAX_PROOFS_VERIFIED {
                return Err(ZkError::CompilationError {
                    circuit: self.name.clone(),
                    reason: format!(
                        "accepted profile allows {} proofs, at most {MAX_PROOFS_VERIFIED} supported",
                        profile.max_proofs_verified
                    ),
                });
            }
            if self.max_proofs_verified == 0 {
                return Err(ZkError::CompilationError {
                    circuit: self.name.clone(),
                    reason: "accepts sideloaded proofs but declares max_proofs_verified = 0"
                        .into(),
                });
            }
        }
        Ok(())
    }
}

/// A provable computation.
pub trait Circuit: Send + Sync {
    type PublicInput: PublicValue;
    type PublicOutput: PublicValue;
    /// Private inputs. Consumed by proving.
    type Witness;

    fn descriptor(&self) -> CircuitDescriptor;

    /// Run the circuit. Returning an error aborts proof construction.
    fn synthesize(
        &self,
        cx: &Synthesizer<'_>,
        input: &Self::PublicInput,
        witness: Self::Witness,
    ) -> ZkResult<Self::PublicOutput>;
}

/// Object-safe verification surface: what a circuit may ask of the
/// backend while it is being proven.
pub trait ProofVerifier: Send + Sync {
    /// Backend-native verification. Never fails; `false` on any mismatch.
    fn verify_raw(&self, proof: &RawProof, key: &VerificationKey) -> bool;

    /// The backend's field hash.
    fn hash(&self, elements: &[FieldElement]) -> FieldElement;
}

/// Private module that seals [`ProofSystem`].
mod private {
    pub trait Sealed {}
}

/// Sealed trait for a proof backend.
///
/// `compile` and `prove` are treated as long-running synchronous calls;
/// callers that need responsiveness run them on worker threads.
/// Implementations are `Send + Sync` so that can happen freely.
pub trait ProofSystem: private::Sealed + ProofVerifier {
    /// Which backend this is, for policy checks.
    fn backend(&self) -> ProofBackend;

    /// Compile a circuit into its verification key.
    ///
    /// # Errors
    ///
    /// `CompilationError` if the descriptor is malformed.
    fn compile<C: Circuit>(&self, circuit: &C) -> ZkResult<VerificationKey>;

    /// Run the circuit on `input` and `witness` and attest the result.
    ///
    /// # Errors
    ///
    /// `ConstraintViolation` when an assertion inside the circuit fails;
    /// any error raised by a nested verification (`ProofInvalid`,
    /// `UntrustedKey`, ...) is passed through unchanged.
    fn prove<C: Circuit>(
        &self,
        circuit: &C,
        input: C::PublicInput,
        witness: C::Witness,
    ) -> ZkResult<Proof<C::PublicInput, C::PublicOutput>>;

    /// Typed convenience over [`ProofVerifier::verify_raw`].
    fn verify<In: PublicValue, Out: PublicValue>(
        &self,
        proof: &Proof<In, Out>,
        key: &VerificationKey,
    ) -> bool {
        self.verify_raw(&proof.to_raw(), key)
    }
}

impl private::Sealed for crate::mock::MockProofSystem {}

/// Proving-time context handed to [`Circuit::synthesize`].
pub struct Synthesizer<'a> {
    circuit: &'a str,
    verifier: &'a dyn ProofVerifier,
    self_key: &'a VerificationKey,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        circuit: &'a str,
        verifier: &'a dyn ProofVerifier,
        self_key: &'a VerificationKey,
    ) -> Self {
        Self {
            circuit,
            verifier,
            self_key,
        }
    }

    pub fn circuit_name(&self) -> &str {
        self.circuit
    }

    /// Verification key of the circuit being proven. Self-recursive
    /// circuits check their predecessor proofs against it.
    pub fn self_key(&self) -> &VerificationKey {
        self.self_key
    }

    /// Fail with `ConstraintViolation` unless `condition` holds.
    pub fn assert(&self, condition: bool, reason: impl FnOnce() -> String) -> ZkResult<()> {
        if condition {
            Ok(())
        } else {
            Err(ZkError::ConstraintViolation {
                circuit: self.circuit.to_string(),
                reason: reason(),
            })
        }
    }
}

impl ProofVerifier for Synthesizer<'_> {
    fn verify_raw(&self, proof: &RawProof, key: &VerificationKey) -> bool {
        self.verifier.verify_raw(proof, key)
    }

    fn hash(&self, elements: &[FieldElement]) -> FieldElement {
        self.verifier.hash(elements)
    }
}
