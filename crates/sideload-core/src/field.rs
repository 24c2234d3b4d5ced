//! # Field Elements — Goldilocks Prime Field
//!
//! `FieldElement` is the native scalar of the proof backend. Every public
//! input, public output, registry leaf, Merkle node, and verification-key
//! hash in the workspace is one of these.
//!
//! ## Representation
//!
//! The modulus is the Goldilocks prime `p = 2^64 - 2^32 + 1`. Elements are
//! stored in canonical form: the wrapped `u64` is always in `[0, p)`. The
//! inner field is private, so the only ways in are [`FieldElement::new`]
//! (reduces) and [`FieldElement::try_from_canonical`] (rejects).
//!
//! ## Serialization
//!
//! Serializes as a plain JSON integer. Deserialization goes through
//! `TryFrom<u64>`, so a persisted value outside `[0, p)` is rejected rather
//! than silently reduced.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The Goldilocks prime `2^64 - 2^32 + 1`.
pub const MODULUS: u64 = 0xffff_ffff_0000_0001;

/// A `u64` that is not a canonical field representative.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("value {0} is not a canonical field element (modulus {MODULUS})")]
pub struct NonCanonicalElement(pub u64);

/// An element of the Goldilocks field in canonical form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct FieldElement(u64);

impl FieldElement {
    /// Additive identity. Doubles as the `EMPTY` registry leaf.
    pub const ZERO: FieldElement = FieldElement(0);
    /// Multiplicative identity.
    pub const ONE: FieldElement = FieldElement(1);

    /// Build an element from any `u64`, reducing modulo `p`.
    pub const fn new(value: u64) -> Self {
        if value >= MODULUS {
            Self(value - MODULUS)
        } else {
            Self(value)
        }
    }

    /// Build an element from a value that must already be canonical.
    pub fn try_from_canonical(value: u64) -> Result<Self, NonCanonicalElement> {
        if value < MODULUS {
            Ok(Self(value))
        } else {
            Err(NonCanonicalElement(value))
        }
    }

    /// Reduce the first eight little-endian bytes of a digest into the field.
    pub fn from_le_digest(digest: &[u8; 32]) -> Self {
        let mut limb = [0u8; 8];
        limb.copy_from_slice(&digest[..8]);
        Self::new(u64::from_le_bytes(limb))
    }

    /// The canonical `u64` representative.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Canonical little-endian encoding, used when hashing.
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u64> for FieldElement {
    type Error = NonCanonicalElement;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::try_from_canonical(value)
    }
}

impl From<FieldElement> for u64 {
    fn from(value: FieldElement) -> Self {
        value.0
    }
}

impl From<u32> for FieldElement {
    fn from(value: u32) -> Self {
        Self(u64::from(value))
    }
}

impl Add for FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: Self) -> Self::Output {
        let sum = (u128::from(self.0) + u128::from(rhs.0)) % u128::from(MODULUS);
        // `sum < MODULUS`, so the narrowing is lossless.
        Self(sum as u64)
    }
}

impl Sub for FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.0 >= rhs.0 {
            Self(self.0 - rhs.0)
        } else {
            Self(MODULUS - (rhs.0 - self.0))
        }
    }
}

impl Mul for FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: Self) -> Self::Output {
        let product = (u128::from(self.0) * u128::from(rhs.0)) % u128::from(MODULUS);
        Self(product as u64)
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> Self::Output {
        if self.0 == 0 {
            self
        } else {
            Self(MODULUS - self.0)
        }
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldElement").field(&self.0).finish()
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_reduces_values_above_modulus() {
        assert_eq!(FieldElement::new(MODULUS), FieldElement::ZERO);
        assert_eq!(FieldElement::new(MODULUS + 7).as_u64(), 7);
        assert_eq!(FieldElement::new(u64::MAX).as_u64(), u64::MAX - MODULUS);
    }

    #[test]
    fn try_from_canonical_rejects_modulus() {
        assert!(FieldElement::try_from_canonical(MODULUS - 1).is_ok());
        assert_eq!(
            FieldElement::try_from_canonical(MODULUS),
            Err(NonCanonicalElement(MODULUS))
        );
    }

    #[test]
    fn small_arithmetic() {
        let three = FieldElement::new(3);
        assert_eq!((three * three).as_u64(), 9);
        assert_eq!((FieldElement::new(9) + FieldElement::new(4)).as_u64(), 13);
        assert_eq!((FieldElement::new(4) - FieldElement::new(9)), -FieldElement::new(5));
    }

    #[test]
    fn addition_wraps_at_modulus() {
        let max = FieldElement::new(MODULUS - 1);
        assert_eq!(max + FieldElement::ONE, FieldElement::ZERO);
        assert_eq!(FieldElement::ZERO - FieldElement::ONE, max);
    }

    #[test]
    fn negation_of_zero_is_zero() {
        assert_eq!(-FieldElement::ZERO, FieldElement::ZERO);
        assert!((-FieldElement::ZERO).is_zero());
    }

    #[test]
    fn from_le_digest_uses_first_limb() {
        let mut digest = [0xffu8; 32];
        digest[..8].copy_from_slice(&42u64.to_le_bytes());
        assert_eq!(FieldElement::from_le_digest(&digest).as_u64(), 42);
    }

    #[test]
    fn serde_is_a_bare_integer() {
        let json = serde_json::to_string(&FieldElement::new(13)).unwrap();
        assert_eq!(json, "13");
        let back: FieldElement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FieldElement::new(13));
    }

    #[test]
    fn serde_rejects_non_canonical() {
        let json = MODULUS.to_string();
        assert!(serde_json::from_str::<FieldElement>(&json).is_err());
    }

    #[test]
    fn display_is_decimal() {
        assert_eq!(FieldElement::new(9).to_string(), "9");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn element() -> impl Strategy<Value = FieldElement> {
        any::<u64>().prop_map(FieldElement::new)
    }

    proptest! {
        #[test]
        fn always_canonical(a in element(), b in element()) {
            prop_assert!((a + b).as_u64() < MODULUS);
            prop_assert!((a * b).as_u64() < MODULUS);
            prop_assert!((a - b).as_u64() < MODULUS);
        }

        #[test]
        fn sub_inverts_add(a in element(), b in element()) {
            prop_assert_eq!((a + b) - b, a);
        }

        #[test]
        fn add_and_mul_commute(a in element(), b in element()) {
            prop_assert_eq!(a + b, b + a);
            prop_assert_eq!(a * b, b * a);
        }

        #[test]
        fn neg_is_additive_inverse(a in element()) {
            prop_assert_eq!(a + (-a), FieldElement::ZERO);
        }

        #[test]
        fn mul_distributes(a in element(), b in element(), c in element()) {
            prop_assert_eq!(a * (b + c), a * b + a * c);
        }
    }
}
