//! # Dynamic (Sideloaded) Proofs
//!
//! A [`DynamicProof`] is a proof whose verification key is not fixed when
//! the verifying circuit is compiled. The key is supplied at proving time,
//! and the caller is expected to have established trust in it through a
//! [`KeyRegistry`](crate::registry::KeyRegistry) first.
//!
//! The verifying circuit still has to know an upper bound on what it may
//! be asked to verify. That bound is the binder's
//! [`CapabilityProfile`]; [`DynamicProofBinder::bind`] refuses any proof
//! from a circuit that exceeds it. A `DynamicProof` may have been bound by
//! some other binder, so [`DynamicProofBinder::verify_conditional`] checks
//! the proof, and the required key, against its own profile again.
//!
//! ## Conditional verification
//!
//! Base cases carry a placeholder proof that must not be checked. Instead
//! of a bare boolean, [`DynamicProofBinder::verify_conditional`] takes a
//! [`Check`], which can only be derived from public data: an
//! unconditional [`Check::require`], [`Check::skip_if_output_is`], which
//! skips exactly when the proof's public output is the caller's identity
//! element, or [`Check::skip_if_state_is`], which skips exactly when the
//! caller's own public state is the identity.
//!
//! Skipping on the proof's output is only sound when that output cannot
//! change the caller's state (an additive zero, say). A caller that adopts
//! the proof's output as its next state must skip on its own state.
//!
//! The binder never constrains the key itself. Verifying against an
//! unchecked key proves nothing.

use sideload_core::{ZkError, ZkResult};

use crate::capability::{CapabilityProfile, FeatureSet};
use crate::key::VerificationKey;
use crate::policy::ProofPolicy;
use crate::proof::{Proof, ProofMeta};
use crate::traits::{ProofVerifier, PublicValue};

/// A proof with its static origin erased, bounded by a capability profile.
///
/// Only [`DynamicProofBinder::bind`] constructs one.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicProof<In, Out> {
    proof: Proof<In, Out>,
}

impl<In: PublicValue, Out: PublicValue> DynamicProof<In, Out> {
    pub fn public_input(&self) -> &In {
        self.proof.public_input()
    }

    pub fn public_output(&self) -> &Out {
        self.proof.public_output()
    }

    pub fn features(&self) -> FeatureSet {
        self.proof.features()
    }

    pub fn max_proofs_verified(&self) -> u8 {
        self.proof.max_proofs_verified()
    }

    pub fn meta(&self) -> &ProofMeta {
        self.proof.meta()
    }

    pub fn into_inner(self) -> Proof<In, Out> {
        self.proof
    }
}

#[derive(Debug, Clone, Copy)]
enum CheckKind<'k> {
    Skip,
    Require(&'k VerificationKey),
}

/// Whether a dynamic proof must verify, and against which key.
#[derive(Debug, Clone, Copy)]
pub struct Check<'k>(CheckKind<'k>);

impl<'k> Check<'k> {
    /// Always verify against `key`.
    pub fn require(key: &'k VerificationKey) -> Self {
        Check(CheckKind::Require(key))
    }

    /// Skip iff the proof's public output equals `identity`; otherwise
    /// verify against `key`.
    pub fn skip_if_output_is<In: PublicValue, Out: PublicValue>(
        proof: &DynamicProof<In, Out>,
        identity: &Out,
        key: &'k VerificationKey,
    ) -> Self {
        if proof.public_output() == identity {
            Check(CheckKind::Skip)
        } else {
            Check(CheckKind::Require(key))
        }
    }

    /// Skip iff the caller's public `state` equals `identity`; otherwise
    /// verify against `key`. The proof plays no part in the decision.
    pub fn skip_if_state_is<S: PartialEq>(
        state: &S,
        identity: &S,
        key: &'k VerificationKey,
    ) -> Self {
        if state == identity {
            Check(CheckKind::Skip)
        } else {
            Check(CheckKind::Require(key))
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.0, CheckKind::Skip)
    }

    /// The key verification will run against, if any.
    pub fn required_key(&self) -> Option<&'k VerificationKey> {
        match self.0 {
            CheckKind::Skip => None,
            CheckKind::Require(key) => Some(key),
        }
    }
}

/// Binds proofs into [`DynamicProof`]s and verifies them conditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicProofBinder {
    profile: CapabilityProfile,
    policy: ProofPolicy,
}

impl DynamicProofBinder {
    pub fn new(profile: CapabilityProfile, policy: ProofPolicy) -> Self {
        Self { profile, policy }
    }

    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    pub fn policy(&self) -> ProofPolicy {
        self.policy
    }

    /// Erase the proof's static identity.
    ///
    /// # Errors
    ///
    /// `CapabilityMismatch` if the originating circuit uses a feature, or
    /// verifies more proofs, than the profile allows.
    pub fn bind<In: PublicValue, Out: PublicValue>(
        &self,
        proof: Proof<In, Out>,
    ) -> ZkResult<DynamicProof<In, Out>> {
        if let Err(err) = self
            .profile
            .admits(&proof.features(), proof.max_proofs_verified())
        {
            tracing::warn!(circuit = %proof.meta().circuit, %err, "refusing to bind proof");
            return Err(err);
        }
        Ok(DynamicProof { proof })
    }

    /// Verify `proof` unless `check` says to skip.
    ///
    /// The proof's origin must fit this binder's profile whether or not the
    /// check is skipped. A skipped check on a proof this binder admits
    /// never fails.
    ///
    /// # Errors
    ///
    /// `CapabilityMismatch` if the proof's origin, or the required key,
    /// exceeds the profile; `PolicyRejected` if verification is required
    /// and the policy refuses the proof's backend; `ProofInvalid` if the
    /// backend does not accept the proof under the required key.
    pub fn verify_conditional<In: PublicValue, Out: PublicValue>(
        &self,
        verifier: &dyn ProofVerifier,
        proof: &DynamicProof<In, Out>,
        check: Check<'_>,
    ) -> ZkResult<()> {
        if let Err(err) = self
            .profile
            .admits(&proof.features(), proof.max_proofs_verified())
        {
            tracing::warn!(circuit = %proof.meta().circuit, %err, "dynamic proof outside profile");
            return Err(err);
        }
        let key = match check.0 {
            CheckKind::Skip => {
                tracing::debug!(circuit = %proof.meta().circuit, "dynamic proof check skipped");
                return Ok(());
            }
            CheckKind::Require(key) => key,
        };
        if let Err(err) = self.profile.admits(&key.features(), key.max_proofs_verified()) {
            tracing::warn!(key = %key.hash(), circuit = %key.name(), %err, "key outside profile");
            return Err(err);
        }
        self.policy.validate(proof.meta().backend)?;
        if verifier.verify_raw(&proof.proof.to_raw(), key) {
            tracing::debug!(key = %key.hash(), "dynamic proof verified");
            Ok(())
        } else {
            tracing::warn!(key = %key.hash(), circuit = %proof.meta().circuit, "dynamic proof failed verification");
            Err(ZkError::ProofInvalid(format!(
                "proof from circuit `{}` does not verify against key {}",
                proof.meta().circuit,
                key.hash()
            )))
        }
    }
}
