//! # sideload-crypto — Hash and Commitment Primitives
//!
//! - **Field hash** (`hash.rs`): `hash(FieldElement...) -> FieldElement`,
//!   the only hash the registry and the mock backend use.
//! - **Sparse Merkle tree** (`merkle.rs`): fixed-depth, write-once leaf
//!   arena with authentication-path witnesses. The verification-key
//!   registry commits to its contents through the root.

pub mod hash;
pub mod merkle;

pub use hash::{hash_fields, hash_pair};
pub use merkle::{
    empty_root, empty_subtree_roots, MerkleTree, MerkleWitness, WitnessStep, MAX_DEPTH,
    REGISTRY_DEPTH,
};
