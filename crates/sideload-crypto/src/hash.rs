//! # Field Hash
//!
//! The `hash(FieldElement...) -> FieldElement` primitive. Merkle nodes,
//! the mock backend's `hash`, and anything else that needs an in-field
//! commitment go through [`hash_fields`].
//!
//! ## Construction
//!
//! `SHA256(0x02 || len_le_u64 || e_0_le || ... || e_{n-1}_le)`, reduced into
//! the field by taking the first eight digest bytes little-endian mod `p`.
//! The length prefix keeps `hash([a])` and `hash([a, 0])` apart.
//!
//! This stands in for an arithmetization-friendly hash (Poseidon) that a
//! real backend would provide. Only determinism and collision resistance
//! are relied upon.

use sha2::{Digest, Sha256};

use sideload_core::FieldElement;

const DOMAIN_FIELDS: u8 = 0x02;

/// Hash a sequence of field elements into one field element.
pub fn hash_fields(elements: &[FieldElement]) -> FieldElement {
    let mut hasher = Sha256::new();
    hasher.update([DOMAIN_FIELDS]);
    hasher.update((elements.len() as u64).to_le_bytes());
    for e in elements {
        hasher.update(e.to_le_bytes());
    }
    let digest: [u8; 32] = hasher.finalize().into();
    FieldElement::from_le_digest(&digest)
}

/// Parent of two sibling Merkle nodes.
pub fn hash_pair(left: FieldElement, right: FieldElement) -> FieldElement {
    hash_fields(&[left, right])
}
