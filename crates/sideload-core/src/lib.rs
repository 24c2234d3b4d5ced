//! # sideload-core — Foundational Types
//!
//! The leaf of the workspace DAG. Defines the values every other crate
//! passes around when composing proofs whose sub-circuit identity is only
//! known at proving time.
//!
//! ## Key Design Principles
//!
//! 1. **One field type.** [`FieldElement`] is the backend's native scalar.
//!    Public inputs, outputs, Merkle nodes, and key hashes all use it; the
//!    inner `u64` is private and always canonical.
//!
//! 2. **One error taxonomy.** [`ZkError`] names every way a recursive step
//!    can fail (`UntrustedKey`, `SlotOccupied`, `ContinuityBroken`, ...).
//!    Downstream crates return it directly instead of wrapping.
//!
//! 3. **`CanonicalBytes` newtype.** All digest computation flows through
//!    `CanonicalBytes::new()`, so key hashes and proof commitments never
//!    depend on serialization order.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sideload-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod field;

pub use canonical::CanonicalBytes;
pub use digest::{digest_to_field, sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, ZkError, ZkResult};
pub use field::{FieldElement, NonCanonicalElement, MODULUS};

/// The reserved value of an unoccupied registry slot.
pub const EMPTY: FieldElement = FieldElement::ZERO;
