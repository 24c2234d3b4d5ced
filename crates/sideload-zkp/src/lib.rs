//! # sideload-zkp — Sideloaded Proof Verification
//!
//! Lets a verifier circuit accept proofs against a verification key that is
//! only known at proving time, while still pinning that key to a trusted
//! set.
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): the sealed [`ProofSystem`] backend trait
//!   (`compile`, `prove`, `verify`, `hash`) and the [`Circuit`] trait.
//!   [`MockProofSystem`] is the only backend.
//!
//! - **Keys and proofs** (`key.rs`, `proof.rs`): [`VerificationKey`] with a
//!   cached field hash, and the immutable [`Proof<In, Out>`].
//!
//! - **Capability profiles** (`capability.rs`): the union of sibling
//!   circuits' features that bounds what a dynamic verifier accepts.
//!
//! - **Dynamic proofs** (`dynamic.rs`): [`DynamicProofBinder`] erases a
//!   proof's static identity and verifies it under a [`Check`] derived from
//!   public data.
//!
//! - **Registries** (`registry.rs`): [`Allowlist`] and [`MerkleRegistry`],
//!   both behind [`KeyRegistry`].
//!
//! - **Policy** (`policy.rs`): refuses mock proofs in production mode.
//!
//! ## Composition
//!
//! A verifier circuit must call [`KeyRegistry::ensure_trusted`] on the key
//! before handing it to [`DynamicProofBinder::verify_conditional`]. The
//! binder does not check which key it is given.

pub mod capability;
pub mod dynamic;
pub mod key;
pub mod mock;
pub mod policy;
pub mod proof;
pub mod registry;
pub mod traits;

pub use capability::{compute_profile, CapabilityProfile, FeatureSet};
pub use dynamic::{Check, DynamicProof, DynamicProofBinder};
pub use key::VerificationKey;
pub use mock::MockProofSystem;
pub use policy::{PolicyError, PolicyMode, ProofBackend, ProofPolicy};
pub use proof::{Proof, ProofMeta, RawProof};
pub use registry::{Allowlist, KeyRegistry, MerkleRegistry};
pub use traits::{
    Circuit, CircuitDescriptor, ProofSystem, ProofVerifier, PublicValue, Synthesizer,
    MAX_PROOFS_VERIFIED,
};
