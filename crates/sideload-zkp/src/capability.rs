//! # Capability Profiles
//!
//! A circuit that verifies a [`DynamicProof`](crate::dynamic::DynamicProof)
//! has to fix, before it is compiled, which structural features any
//! accepted sub-proof may use. That upper bound is a
//! [`CapabilityProfile`]: the elementwise union of the feature usage of
//! every sibling circuit the verifier may ever see.
//!
//! Adding a sibling with a broader feature set changes the profile, which
//! changes the verifier's descriptor and therefore its verification key.
//! Every circuit holding a binder over that sibling set must be recompiled.

use serde::{Deserialize, Serialize};

use sideload_core::{ZkError, ZkResult};

use crate::key::VerificationKey;
use crate::traits::CircuitDescriptor;

/// Structural gate types a compiled circuit may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureSet {
    pub range_check0: bool,
    pub range_check1: bool,
    pub foreign_field_add: bool,
    pub foreign_field_mul: bool,
    pub xor: bool,
    pub rot: bool,
    pub lookup: bool,
    pub runtime_tables: bool,
}

impl FeatureSet {
    /// No optional gates.
    pub const NONE: FeatureSet = FeatureSet {
        range_check0: false,
        range_check1: false,
        foreign_field_add: false,
        foreign_field_mul: false,
        xor: false,
        rot: false,
        lookup: false,
        runtime_tables: false,
    };

    /// Every optional gate.
    pub const ALL: FeatureSet = FeatureSet {
        range_check0: true,
        range_check1: true,
        foreign_field_add: true,
        foreign_field_mul: true,
        xor: true,
        rot: true,
        lookup: true,
        runtime_tables: true,
    };

    /// `(name, enabled)` for each feature, in a fixed order.
    pub fn flags(&self) -> [(&'static str, bool); 8] {
        [
            ("range_check0", self.range_check0),
            ("range_check1", self.range_check1),
            ("foreign_field_add", self.foreign_field_add),
            ("foreign_field_mul", self.foreign_field_mul),
            ("xor", self.xor),
            ("rot", self.rot),
            ("lookup", self.lookup),
            ("runtime_tables", self.runtime_tables),
        ]
    }

    /// Per feature, true if either side uses it.
    pub fn union(self, other: FeatureSet) -> FeatureSet {
        FeatureSet {
            range_check0: self.range_check0 || other.range_check0,
            range_check1: self.range_check1 || other.range_check1,
            foreign_field_add: self.foreign_field_add || other.foreign_field_add,
            foreign_field_mul: self.foreign_field_mul || other.foreign_field_mul,
            xor: self.xor || other.xor,
            rot: self.rot || other.rot,
            lookup: self.lookup || other.lookup,
            runtime_tables: self.runtime_tables || other.runtime_tables,
        }
    }

    /// Features used here that `bound` does not allow.
    pub fn outside(&self, bound: &FeatureSet) -> Vec<&'static str> {
        self.flags()
            .into_iter()
            .zip(bound.flags())
            .filter(|((_, used), (_, allowed))| *used && !*allowed)
            .map(|((name, _), _)| name)
            .collect()
    }

    pub fn is_subset_of(&self, bound: &FeatureSet) -> bool {
        self.outside(bound).is_empty()
    }
}

/// Upper bound on what a dynamic verifier accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityProfile {
    /// Union of the sibling circuits' features.
    pub features: FeatureSet,
    /// Largest number of proofs any sibling verifies recursively.
    pub max_proofs_verified: u8,
}

impl CapabilityProfile {
    pub fn new(features: FeatureSet, max_proofs_verified: u8) -> Self {
        Self {
            features,
            max_proofs_verified,
        }
    }

    /// Profile covering every given circuit.
    pub fn compute<'a>(circuits: impl IntoIterator<Item = &'a CircuitDescriptor>) -> Self {
        circuits
            .into_iter()
            .fold(Self::default(), |acc, c| acc.widen(c.features, c.max_proofs_verified))
    }

    /// Profile covering every circuit behind the given compiled keys.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a VerificationKey>) -> Self {
        Self::compute(keys.into_iter().map(VerificationKey::circuit))
    }

    fn widen(self, features: FeatureSet, max_proofs_verified: u8) -> Self {
        Self {
            features: self.features.union(features),
            max_proofs_verified: self.max_proofs_verified.max(max_proofs_verified),
        }
    }

    /// Check that a proof's origin fits inside this profile.
    ///
    /// # Errors
    ///
    /// `CapabilityMismatch` naming every feature outside the profile, or the
    /// recursion width if that is what exceeds it.
    pub fn admits(&self, features: &FeatureSet, max_proofs_verified: u8) -> ZkResult<()> {
        let outside = features.outside(&self.features);
        if !outside.is_empty() {
            return Err(ZkError::CapabilityMismatch(format!(
                "features outside profile: {}",
                outside.join(", ")
            )));
        }
        if max_proofs_verified > self.max_proofs_verified {
            return Err(ZkError::CapabilityMismatch(format!(
                "verifies {max_proofs_verified} proofs, profile allows {}",
                self.max_proofs_verified
            )));
        }
        Ok(())
    }
}

/// Union profile of a set of sibling circuits.
pub fn compute_profile<'a>(
    circuits: impl IntoIterator<Item = &'a CircuitDescriptor>,
) -> CapabilityProfile {
    CapabilityProfile::compute(circuits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, features: FeatureSet, mpv: u8) -> CircuitDescriptor {
        CircuitDescriptor::new(name, features, mpv)
    }

    #[test]
    fn union_is_elementwise() {
        let a = FeatureSet {
            xor: true,
            ..FeatureSet::NONE
        };
        let b = FeatureSet {
            lookup: true,
            ..FeatureSet::NONE
        };
        let u = a.union(b);
        assert!(u.xor && u.lookup);
        assert!(!u.rot);
    }

    #[test]
    fn compute_profile_covers_all_siblings() {
        let circuits = [
            descriptor(
                "a",
                FeatureSet {
                    range_check0: true,
                    ..FeatureSet::NONE
                },
                0,
            ),
            descriptor(
                "b",
                FeatureSet {
                    foreign_field_mul: true,
                    ..FeatureSet::NONE
                },
                1,
            ),
        ];
        let profile = compute_profile(&circuits);
        assert!(profile.features.range_check0);
        assert!(profile.features.foreign_field_mul);
        assert!(!profile.features.xor);
        assert_eq!(profile.max_proofs_verified, 1);
        for c in &circuits {
            assert!(profile.admits(&c.features, c.max_proofs_verified).is_ok());
        }
    }

    #[test]
    fn empty_set_gives_empty_profile() {
        let profile = compute_profile(std::iter::empty());
        assert_eq!(profile, CapabilityProfile::default());
    }

    #[test]
    fn admits_rejects_extra_feature_by_name() {
        let profile = CapabilityProfile::new(FeatureSet::NONE, 0);
        let used = FeatureSet {
            rot: true,
            runtime_tables: true,
            ..FeatureSet::NONE
        };
        match profile.admits(&used, 0) {
            Err(ZkError::CapabilityMismatch(msg)) => {
                assert!(msg.contains("rot"));
                assert!(msg.contains("runtime_tables"));
            }
            other => panic!("expected CapabilityMismatch, got {other:?}"),
        }
    }

    #[test]
    fn admits_rejects_wider_recursion() {
        let profile = CapabilityProfile::new(FeatureSet::ALL, 0);
        assert!(matches!(
            profile.admits(&FeatureSet::NONE, 1),
            Err(ZkError::CapabilityMismatch(_))
        ));
    }

    #[test]
    fn subset_relation() {
        assert!(FeatureSet::NONE.is_subset_of(&FeatureSet::NONE));
        assert!(FeatureSet::NONE.is_subset_of(&FeatureSet::ALL));
        assert!(!FeatureSet::ALL.is_subset_of(&FeatureSet::NONE));
    }
}
