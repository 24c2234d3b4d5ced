//! # Error Types — Proof Composition Failures
//!
//! Defines the error taxonomy shared by every crate in the workspace. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Every failure is local to the step that produced it. Nothing in the
//!   core retries or swallows an error.
//! - Bare verification is a query (`bool`); only the operations that gate
//!   construction of a recursive proof (trust checks, conditional
//!   verification, registry writes, chain steps) return these errors.
//! - Variants carry enough context to tell a malicious prover apart from a
//!   caller bug: key hashes, slot indices, expected vs. claimed states.

use thiserror::Error;

use crate::field::FieldElement;

/// Result alias used throughout the workspace.
pub type ZkResult<T> = Result<T, ZkError>;

/// Top-level error type for sideloaded proof composition.
#[derive(Error, Debug)]
pub enum ZkError {
    /// The circuit definition is malformed. Fatal, never retried.
    #[error("compilation error in circuit `{circuit}`: {reason}")]
    CompilationError {
        /// Name of the circuit being compiled.
        circuit: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An assertion inside the circuit did not hold for the given inputs.
    /// The caller may retry with corrected inputs.
    #[error("constraint violation in circuit `{circuit}`: {reason}")]
    ConstraintViolation {
        /// Name of the circuit being proven.
        circuit: String,
        /// The assertion that failed.
        reason: String,
    },

    /// A proof that was required to verify did not.
    #[error("proof invalid: {0}")]
    ProofInvalid(String),

    /// The supplied verification key is not trusted by the registry.
    #[error("untrusted verification key {key_hash}: {reason}")]
    UntrustedKey {
        /// Hash of the rejected key.
        key_hash: FieldElement,
        /// Why the registry rejected it.
        reason: String,
    },

    /// Attempted to register a key in a slot that is not `EMPTY` under the
    /// current root, or against a stale witness.
    #[error("registry slot {index} is not empty under root {root}")]
    SlotOccupied {
        /// Leaf index the witness points at.
        index: u64,
        /// Registry root at the time of the attempt.
        root: FieldElement,
    },

    /// The predecessor proof's output does not match the claimed chain state.
    #[error("chain continuity broken: expected {expected}, got {actual}")]
    ContinuityBroken {
        /// The state the step was asked to continue from.
        expected: String,
        /// The state the predecessor actually attested.
        actual: String,
    },

    /// A sub-circuit uses a feature outside the declared capability profile.
    #[error("capability mismatch: {0}")]
    CapabilityMismatch(String),

    /// Malformed Merkle tree parameters, indices, or witnesses.
    #[error("merkle error: {0}")]
    Merkle(String),

    /// Persisted data failed an integrity check on load.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// The configured proof policy refused the backend.
    #[error("proof policy rejected backend: {0}")]
    PolicyRejected(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Field elements and counters are integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
