//! # Digest Test Vectors
//!
//! Pins the canonicalize-then-hash pipeline to known SHA-256 outputs.
//! Verification-key hashes are persisted and compared across processes,
//! so a silent change here would invalidate every registered key.

use sideload_core::{digest_to_field, sha256_digest, CanonicalBytes, FieldElement};

#[test]
fn empty_object_vector() {
    let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
    assert_eq!(cb.as_bytes(), b"{}");
    let digest = sha256_digest(&cb);
    assert_eq!(
        digest.to_hex(),
        "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
    );
    assert_eq!(digest.to_field(), FieldElement::new(0x8a67_b355_a36f_1344));
}

#[test]
fn key_order_independent_vector() {
    let forward = serde_json::json!({"a": 1, "b": 2});
    let backward = serde_json::json!({"b": 2, "a": 1});
    let f = CanonicalBytes::new(&forward).unwrap();
    let b = CanonicalBytes::new(&backward).unwrap();
    assert_eq!(f.as_bytes(), br#"{"a":1,"b":2}"#);
    assert_eq!(
        sha256_digest(&f).to_hex(),
        "43258cff783fe7036d8a43033f830adfc60ec037382473548ac742b888292777"
    );
    assert_eq!(digest_to_field(&f), digest_to_field(&b));
    assert_eq!(digest_to_field(&f).as_u64(), 281_263_290_649_945_411);
}
