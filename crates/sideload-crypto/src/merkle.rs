//! # Fixed-Depth Sparse Merkle Tree
//!
//! The commitment behind the verification-key registry. A tree of depth `D`
//! has `2^D` leaf slots, all `EMPTY` initially. Slots are an append-only
//! arena: a leaf is written once, never updated, never cleared. Index
//! allocation is the caller's job.
//!
//! ## Hashing
//!
//! - Leaves are stored as-is (no leaf hash), so a witness recomputes the
//!   root starting from the raw leaf value.
//! - Node: `hash_fields([left, right])`.
//! - Empty subtrees: `Z_0 = EMPTY`, `Z_{h+1} = hash(Z_h, Z_h)`. Only
//!   non-default nodes are stored, so a depth-64 tree costs memory
//!   proportional to the number of occupied slots times `D`.
//!
//! ## Witnesses
//!
//! A [`MerkleWitness`] is `D` (sibling, direction) steps from the leaf up.
//! It is only meaningful against the root it was taken from: after any
//! insert, witnesses for *every* slot must be re-taken.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use sideload_core::{FieldElement, ZkError, ZkResult, EMPTY};

use crate::hash::hash_pair;

/// Depth of the verification-key registry tree.
pub const REGISTRY_DEPTH: usize = 64;

/// Deepest tree supported; indices are `u64`.
pub const MAX_DEPTH: usize = 64;

fn validate_depth(depth: usize) -> ZkResult<()> {
    if depth == 0 || depth > MAX_DEPTH {
        return Err(ZkError::Merkle(format!(
            "depth must be in 1..={MAX_DEPTH}, got {depth}"
        )));
    }
    Ok(())
}

fn validate_index(depth: usize, index: u64) -> ZkResult<()> {
    if depth < MAX_DEPTH && index >> depth != 0 {
        return Err(ZkError::Merkle(format!(
            "index {index} out of range for depth {depth}"
        )));
    }
    Ok(())
}

/// Roots of all-empty subtrees, `zeros[h]` for heights `0..=depth`.
pub fn empty_subtree_roots(depth: usize) -> Vec<FieldElement> {
    let mut zeros = Vec::with_capacity(depth + 1);
    let mut cur = EMPTY;
    zeros.push(cur);
    for _ in 0..depth {
        cur = hash_pair(cur, cur);
        zeros.push(cur);
    }
    zeros
}

/// Root of a tree of the given depth with every slot empty.
pub fn empty_root(depth: usize) -> ZkResult<FieldElement> {
    validate_depth(depth)?;
    Ok(empty_subtree_roots(depth)[depth])
}

// ---------------------------------------------------------------------------
// Witness
// ---------------------------------------------------------------------------

/// One level of an authentication path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessStep {
    /// Hash of the sibling node at this level.
    pub sibling: FieldElement,
    /// Whether the node on the path is the left child at this level.
    pub is_left: bool,
}

/// Authentication path for a single leaf index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WitnessStep>", into = "Vec<WitnessStep>")]
pub struct MerkleWitness {
    path: Vec<WitnessStep>,
}

impl MerkleWitness {
    /// Build a witness from raw steps (leaf level first).
    pub fn new(path: Vec<WitnessStep>) -> ZkResult<Self> {
        validate_depth(path.len())?;
        Ok(Self { path })
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn path(&self) -> &[WitnessStep] {
        &self.path
    }

    /// The root the tree would have if this witness's leaf held `leaf`.
    pub fn calculate_root(&self, leaf: FieldElement) -> FieldElement {
        self.path.iter().fold(leaf, |node, step| {
            if step.is_left {
                hash_pair(node, step.sibling)
            } else {
                hash_pair(step.sibling, node)
            }
        })
    }

    /// Leaf index encoded by the direction bits.
    pub fn calculate_index(&self) -> u64 {
        self.path
            .iter()
            .enumerate()
            .fold(0u64, |index, (level, step)| {
                if step.is_left {
                    index
                } else {
                    index | (1u64 << level)
                }
            })
    }
}

impl TryFrom<Vec<WitnessStep>> for MerkleWitness {
    type Error = ZkError;

    fn try_from(path: Vec<WitnessStep>) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<MerkleWitness> for Vec<WitnessStep> {
    fn from(witness: MerkleWitness) -> Self {
        witness.path
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// Persisted form: depth plus occupied leaves. Interior nodes are rebuilt
/// on load.
#[derive(Serialize, Deserialize)]
struct MerkleTreeRepr {
    depth: usize,
    leaves: BTreeMap<u64, FieldElement>,
}

/// Sparse Merkle tree with write-once leaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "MerkleTreeRepr", into = "MerkleTreeRepr")]
pub struct MerkleTree {
    depth: usize,
    zeros: Vec<FieldElement>,
    /// `nodes[h]` holds the non-default nodes at height `h`; `nodes[0]` are
    /// the occupied leaves, `nodes[depth]` the root.
    nodes: Vec<HashMap<u64, FieldElement>>,
}

impl MerkleTree {
    /// Create an empty tree.
    pub fn new(depth: usize) -> ZkResult<Self> {
        validate_depth(depth)?;
        Ok(Self {
            depth,
            zeros: empty_subtree_roots(depth),
            nodes: vec![HashMap::new(); depth + 1],
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn root(&self) -> FieldElement {
        self.node(self.depth, 0)
    }

    /// Number of occupied slots.
    pub fn leaf_count(&self) -> usize {
        self.nodes[0].len()
    }

    /// Leaf at `index`, `EMPTY` if unoccupied.
    pub fn get_leaf(&self, index: u64) -> ZkResult<FieldElement> {
        validate_index(self.depth, index)?;
        Ok(self.node(0, index))
    }

    fn node(&self, height: usize, index: u64) -> FieldElement {
        self.nodes[height]
            .get(&index)
            .copied()
            .unwrap_or(self.zeros[height])
    }

    /// Write `value` into an empty slot and return the new root.
    ///
    /// # Errors
    ///
    /// `SlotOccupied` if the slot already holds a value (even the same one),
    /// `Merkle` for an out-of-range index or an `EMPTY` value.
    pub fn insert(&mut self, index: u64, value: FieldElement) -> ZkResult<FieldElement> {
        validate_index(self.depth, index)?;
        if value == EMPTY {
            return Err(ZkError::Merkle(format!(
                "cannot write the EMPTY value into slot {index}"
            )));
        }
        if self.nodes[0].contains_key(&index) {
            return Err(ZkError::SlotOccupied {
                index,
                root: self.root(),
            });
        }

        self.nodes[0].insert(index, value);
        let mut idx = index;
        for height in 0..self.depth {
            let left = self.node(height, idx & !1);
            let right = self.node(height, idx | 1);
            idx >>= 1;
            let parent = hash_pair(left, right);
            if parent == self.zeros[height + 1] {
                self.nodes[height + 1].remove(&idx);
            } else {
                self.nodes[height + 1].insert(idx, parent);
            }
        }
        Ok(self.root())
    }

    /// Authentication path for `index` against the current root.
    pub fn witness(&self, index: u64) -> ZkResult<MerkleWitness> {
        validate_index(self.depth, index)?;
        let path = (0..self.depth)
            .map(|height| {
                let idx = index >> height;
                WitnessStep {
                    sibling: self.node(height, idx ^ 1),
                    is_left: idx & 1 == 0,
                }
            })
            .collect();
        Ok(MerkleWitness { path })
    }

    /// Occupied slots in index order.
    pub fn leaves(&self) -> BTreeMap<u64, FieldElement> {
        self.nodes[0].iter().map(|(i, v)| (*i, *v)).collect()
    }
}

impl TryFrom<MerkleTreeRepr> for MerkleTree {
    type Error = ZkError;

    fn try_from(repr: MerkleTreeRepr) -> Result<Self, Self::Error> {
        let mut tree = MerkleTree::new(repr.depth)?;
        for (index, value) in repr.leaves {
            tree.insert(index, value)
                .map_err(|e| ZkError::Integrity(format!("persisted tree rejected: {e}")))?;
        }
        Ok(tree)
    }
}

impl From<MerkleTree> for MerkleTreeRepr {
    fn from(tree: MerkleTree) -> Self {
        MerkleTreeRepr {
            depth: tree.depth,
            leaves: tree.leaves(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// After any sequence of inserts into distinct slots, a fresh witness
        /// for each occupied slot recomputes the final root.
        #[test]
        fn fresh_witnesses_verify(
            entries in prop::collection::btree_map(any::<u64>(), 1u64..sideload_core::MODULUS, 1..8)
        ) {
            let mut tree = MerkleTree::new(REGISTRY_DEPTH).unwrap();
            for (index, value) in &entries {
                tree.insert(*index, FieldElement::new(*value)).unwrap();
            }
            for (index, value) in &entries {
                let witness = tree.witness(*index).unwrap();
                prop_assert_eq!(witness.calculate_root(FieldElement::new(*value)), tree.root());
                prop_assert_eq!(witness.calculate_index(), *index);
            }
        }

        /// Inserting into an occupied slot fails regardless of the value.
        #[test]
        fn second_write_always_fails(index in any::<u64>(), a in 1u64..1_000, b in 1u64..1_000) {
            let mut tree = MerkleTree::new(REGISTRY_DEPTH).unwrap();
            tree.insert(index, FieldElement::new(a)).unwrap();
            let is_occupied = matches!(
                tree.insert(index, FieldElement::new(b)),
                Err(ZkError::SlotOccupied { .. })
            );
            prop_assert!(is_occupied);
        }
    }
}
