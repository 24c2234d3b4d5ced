//! # Canonical Serialization — JCS Byte Production
//!
//! `CanonicalBytes` is the only input accepted by the digest functions.
//! Verification-key blobs and proof statements are hashed from it, so two
//! structurally equal values always hash identically regardless of field
//! order or whitespace.
//!
//! ## Rules
//!
//! 1. **Reject floats.** Every number in a statement is a field element or
//!    a small counter; a float means something upstream is wrong.
//! 2. **Sorted keys, compact separators** via `serde_jcs` (RFC 8785).

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// The inner `Vec<u8>` is private; [`CanonicalBytes::new`] is the only
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number,
    /// `SerializationFailed` if serde or JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(items) => items.iter().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldElement;

    #[test]
    fn keys_are_sorted() {
        let data = serde_json::json!({"value": 9, "registry_root": 4});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"registry_root":4,"value":9}"#);
    }

    #[test]
    fn nested_statement_is_compact() {
        let data = serde_json::json!({
            "circuit": "multiply",
            "public": {"output": [9], "input": []},
        });
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"circuit":"multiply","public":{"input":[],"output":[9]}}"#
        );
    }

    #[test]
    fn field_elements_serialize_as_integers() {
        let elems = vec![FieldElement::new(1), FieldElement::new(u64::MAX)];
        let cb = CanonicalBytes::new(&elems).unwrap();
        let expected = format!("[1,{}]", u64::MAX - crate::field::MODULUS);
        assert_eq!(cb.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn floats_are_rejected_at_any_depth() {
        let data = serde_json::json!({"a": {"b": [{"c": 0.25}]}});
        match CanonicalBytes::new(&data) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 0.25),
            other => panic!("expected FloatRejected, got {other:?}"),
        }
    }

    #[test]
    fn empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 2);
    }
}
