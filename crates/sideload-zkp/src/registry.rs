//! # Verification-Key Registries
//!
//! A circuit that verifies a sideloaded proof must first establish that the
//! key it was handed is one it trusts. [`KeyRegistry`] is that gate.
//!
//! - [`Allowlist`]: a single trusted key hash fixed at construction.
//! - [`MerkleRegistry`]: a root over a sparse, fixed-depth tree of key
//!   hashes. Membership is a [`MerkleWitness`]; the registry itself is just
//!   `(root, depth)`, so it can live inside a recursive chain state.
//!
//! Registries only answer the trust question. Pairing a trusted key with
//! the proof is the job of
//! [`DynamicProofBinder::verify_conditional`](crate::dynamic::DynamicProofBinder::verify_conditional).

use serde::{Deserialize, Serialize};

use sideload_core::{FieldElement, ZkError, ZkResult, EMPTY};
use sideload_crypto::{empty_root, MerkleWitness};

use crate::key::VerificationKey;

/// Decides whether a verification key is trusted.
pub trait KeyRegistry: Send + Sync {
    /// Evidence of membership (`()` for an allowlist, a witness for a tree).
    type Membership;

    /// # Errors
    ///
    /// `UntrustedKey` if the key is not a member.
    fn ensure_trusted(&self, key: &VerificationKey, membership: &Self::Membership)
        -> ZkResult<()>;

    fn is_trusted(&self, key: &VerificationKey, membership: &Self::Membership) -> bool {
        self.ensure_trusted(key, membership).is_ok()
    }
}

/// Trusts exactly one key hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowlist {
    trusted_hash: FieldElement,
}

impl Allowlist {
    pub fn new(trusted_hash: FieldElement) -> Self {
        Self { trusted_hash }
    }

    pub fn for_key(key: &VerificationKey) -> Self {
        Self::new(key.hash())
    }

    pub fn trusted_hash(&self) -> FieldElement {
        self.trusted_hash
    }
}

impl KeyRegistry for Allowlist {
    type Membership = ();

    fn ensure_trusted(&self, key: &VerificationKey, _membership: &()) -> ZkResult<()> {
        if key.hash() == self.trusted_hash {
            return Ok(());
        }
        tracing::warn!(key = %key.hash(), trusted = %self.trusted_hash, "key not on allowlist");
        Err(ZkError::UntrustedKey {
            key_hash: key.hash(),
            reason: format!("allowlist trusts only {}", self.trusted_hash),
        })
    }
}

/// Root-and-depth view of a key registry tree.
///
/// Index allocation is up to the caller. Inserts take `&mut self` and are
/// strictly ordered; a witness computed against an older root no longer
/// matches and fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleRegistry {
    root: FieldElement,
    depth: usize,
}

impl MerkleRegistry {
    /// Registry over an all-empty tree.
    ///
    /// # Errors
    ///
    /// `Merkle` if `depth` is outside `1..=64`.
    pub fn empty(depth: usize) -> ZkResult<Self> {
        Ok(Self {
            root: empty_root(depth)?,
            depth,
        })
    }

    /// Resume from a known root.
    pub fn at(root: FieldElement, depth: usize) -> Self {
        Self { root, depth }
    }

    pub fn root(&self) -> FieldElement {
        self.root
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Root after writing `key`'s hash into the empty slot `witness`
    /// points at. Does not modify `self`.
    ///
    /// # Errors
    ///
    /// As [`MerkleRegistry::insert`].
    pub fn root_after_insert(
        &self,
        key: &VerificationKey,
        witness: &MerkleWitness,
    ) -> ZkResult<FieldElement> {
        self.check_depth(witness)?;
        if key.hash() == EMPTY {
            return Err(ZkError::Merkle(
                "key hash equals the EMPTY leaf and cannot be registered".into(),
            ));
        }
        if witness.calculate_root(EMPTY) != self.root {
            return Err(ZkError::SlotOccupied {
                index: witness.calculate_index(),
                root: self.root,
            });
        }
        Ok(witness.calculate_root(key.hash()))
    }

    /// Register `key` in the empty slot `witness` points at and return the
    /// new root.
    ///
    /// # Errors
    ///
    /// `SlotOccupied` if the slot is not `EMPTY` under the current root (or
    /// the witness is stale), `Merkle` if the witness depth is wrong.
    pub fn insert(&mut self, key: &VerificationKey, witness: &MerkleWitness) -> ZkResult<FieldElement> {
        let root = self.root_after_insert(key, witness)?;
        tracing::debug!(
            index = witness.calculate_index(),
            key = %key.hash(),
            %root,
            "registered verification key"
        );
        self.root = root;
        Ok(root)
    }

    fn check_depth(&self, witness: &MerkleWitness) -> ZkResult<()> {
        if witness.depth() != self.depth {
            return Err(ZkError::Merkle(format!(
                "witness depth {} does not match registry depth {}",
                witness.depth(),
                self.depth
            )));
        }
        Ok(())
    }
}

impl KeyRegistry for MerkleRegistry {
    type Membership = MerkleWitness;

    fn ensure_trusted(&self, key: &VerificationKey, witness: &MerkleWitness) -> ZkResult<()> {
        let reason = if witness.depth() != self.depth {
            format!(
                "witness depth {} does not match registry depth {}",
                witness.depth(),
                self.depth
            )
        } else if witness.calculate_root(key.hash()) != self.root {
            format!(
                "not a member at index {} under root {}",
                witness.calculate_index(),
                self.root
            )
        } else {
            return Ok(());
        };
        tracing::warn!(key = %key.hash(), root = %self.root, %reason, "key not in registry");
        Err(ZkError::UntrustedKey {
            key_hash: key.hash(),
            reason,
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::capability::FeatureSet;
    use crate::policy::ProofBackend;
    use crate::traits::CircuitDescriptor;
    use proptest::prelude::*;
    use sideload_crypto::MerkleTree;

    fn key(name: String) -> VerificationKey {
        VerificationKey::new(
            ProofBackend::Mock,
            CircuitDescriptor::new(name, FeatureSet::NONE, 0),
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn allowlist_matches_hash_equality(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            let (ka, kb) = (key(a), key(b));
            let list = Allowlist::for_key(&ka);
            prop_assert_eq!(list.is_trusted(&kb, &()), ka.hash() == kb.hash());
        }

        #[test]
        fn fresh_witness_recomputes_new_root(
            slots in prop::collection::btree_set(0u64..256, 1..6)
        ) {
            let mut tree = MerkleTree::new(8).unwrap();
            let mut registry = MerkleRegistry::empty(8).unwrap();
            for slot in &slots {
                let k = key(format!("circuit-{slot}"));
                let new_root = registry.insert(&k, &tree.witness(*slot).unwrap()).unwrap();
                tree.insert(*slot, k.hash()).unwrap();
                prop_assert_eq!(tree.witness(*slot).unwrap().calculate_root(k.hash()), new_root);
            }
            for slot in &slots {
                let k = key(format!("circuit-{slot}"));
                prop_assert!(registry.is_trusted(&k, &tree.witness(*slot).unwrap()));
            }
        }
    }
}
