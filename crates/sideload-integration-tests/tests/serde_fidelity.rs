//! # Serde Round-Trip Fidelity
//!
//! Every persisted type survives a JSON round-trip, and the integrity
//! checks on load reject tampered input.

use serde_json::json;

use sideload_chain::{ChainLink, ChainState, MultiplyCircuit};
use sideload_core::FieldElement;
use sideload_crypto::{MerkleTree, MerkleWitness};
use sideload_zkp::{
    CapabilityProfile, FeatureSet, MerkleRegistry, MockProofSystem, Proof, ProofSystem,
    VerificationKey,
};

fn round_trip<T>(value: &T) -> T
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    let json = serde_json::to_string(value).expect("serialize");
    serde_json::from_str(&json).expect("deserialize")
}

#[test]
fn field_element_is_a_plain_integer() {
    let x = FieldElement::new(42);
    assert_eq!(serde_json::to_value(x).unwrap(), json!(42));
    assert_eq!(round_trip(&x), x);
}

#[test]
fn non_canonical_field_element_rejected() {
    let p = sideload_core::MODULUS;
    assert!(serde_json::from_value::<FieldElement>(json!(p)).is_err());
    assert!(serde_json::from_value::<FieldElement>(json!(p - 1)).is_ok());
}

#[test]
fn verification_key() {
    let vk = MockProofSystem::new().compile(&MultiplyCircuit).unwrap();
    let back = round_trip(&vk);
    assert_eq!(back, vk);
    assert_eq!(back.hash(), vk.hash());
    assert_eq!(back.circuit(), vk.circuit());
}

#[test]
fn verification_key_hash_tamper() {
    let vk = MockProofSystem::new().compile(&MultiplyCircuit).unwrap();
    let mut v = serde_json::to_value(&vk).unwrap();
    v["hash"] = json!(1);
    assert!(serde_json::from_value::<VerificationKey>(v).is_err());
}

#[test]
fn merkle_tree_rebuilds_interior_nodes() {
    let mut tree = MerkleTree::new(64).unwrap();
    tree.insert(1, FieldElement::new(10)).unwrap();
    tree.insert(u64::MAX, FieldElement::new(20)).unwrap();
    let back = round_trip(&tree);
    assert_eq!(back.root(), tree.root());
    assert_eq!(back.leaves(), tree.leaves());
    assert_eq!(back.witness(1).unwrap(), tree.witness(1).unwrap());
}

#[test]
fn merkle_tree_rejects_out_of_range_index() {
    let json = json!({ "depth": 4, "leaves": { "16": 3 } });
    assert!(serde_json::from_value::<MerkleTree>(json).is_err());
}

#[test]
fn merkle_witness() {
    let mut tree = MerkleTree::new(8).unwrap();
    tree.insert(5, FieldElement::new(77)).unwrap();
    let w = tree.witness(5).unwrap();
    let back: MerkleWitness = round_trip(&w);
    assert_eq!(back, w);
    assert_eq!(back.calculate_index(), 5);
    assert_eq!(back.calculate_root(FieldElement::new(77)), tree.root());
}

#[test]
fn empty_witness_rejected() {
    assert!(serde_json::from_value::<MerkleWitness>(json!([])).is_err());
}

#[test]
fn chain_state_is_two_field_elements() {
    let s = ChainState::genesis(FieldElement::new(3), FieldElement::new(4));
    assert_eq!(
        serde_json::to_value(s).unwrap(),
        json!({ "registry_root": 3, "value": 4 })
    );
    assert_eq!(round_trip(&s), s);
}

#[test]
fn proof_and_link() {
    let backend = MockProofSystem::new();
    let vk = backend.compile(&MultiplyCircuit).unwrap();
    let proof = backend
        .prove(&MultiplyCircuit, (), (FieldElement::new(6), FieldElement::new(7)))
        .unwrap();
    let back: Proof<(), FieldElement> = round_trip(&proof);
    assert_eq!(back, proof);
    assert!(backend.verify(&back, &vk));

    let s = ChainState::genesis(FieldElement::new(1), FieldElement::new(2));
    let link = ChainLink::step(Proof::dummy(s, s, 2));
    assert_eq!(round_trip(&link), link);
    assert_eq!(round_trip(&ChainLink::Genesis), ChainLink::Genesis);
}

#[test]
fn registry_and_profile() {
    let registry = MerkleRegistry::empty(64).unwrap();
    assert_eq!(round_trip(&registry), registry);

    let profile = CapabilityProfile::new(
        FeatureSet {
            xor: true,
            rot: true,
            ..FeatureSet::NONE
        },
        1,
    );
    assert_eq!(round_trip(&profile), profile);
}
