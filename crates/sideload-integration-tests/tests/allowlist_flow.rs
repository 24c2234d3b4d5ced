//! # Allowlist Flow
//!
//! `multiply` is the only trusted sub-circuit of `add`. The base case adds
//! a skipped placeholder, the second addition verifies a real product.

use sideload_chain::{AddCircuit, AddWitness, MultiplyCircuit};
use sideload_core::{FieldElement, ZkError};
use sideload_zkp::{
    Allowlist, CapabilityProfile, DynamicProofBinder, KeyRegistry, MockProofSystem, Proof,
    ProofPolicy, ProofSystem,
};

fn fe(x: u64) -> FieldElement {
    FieldElement::new(x)
}

fn setup() -> (MockProofSystem, sideload_zkp::VerificationKey, AddCircuit) {
    let backend = MockProofSystem::new();
    let mul_vk = backend.compile(&MultiplyCircuit).unwrap();
    let add = AddCircuit::new(
        Allowlist::for_key(&mul_vk),
        DynamicProofBinder::new(
            CapabilityProfile::from_keys([&mul_vk]),
            ProofPolicy::development(),
        ),
    );
    (backend, mul_vk, add)
}

#[test]
fn five_nine_thirteen() {
    let (backend, mul_vk, add) = setup();
    let add_vk = backend.compile(&add).unwrap();

    // add(5, dummy, mul_vk): output 0 means skip.
    let dummy = add.binder().bind(Proof::dummy((), fe(0), 0)).unwrap();
    let base = backend
        .prove(&add, fe(5), AddWitness { proof: dummy, key: mul_vk.clone() })
        .unwrap();
    assert_eq!(*base.public_output(), fe(5));
    assert!(backend.verify(&base, &add_vk));

    let nine = backend.prove(&MultiplyCircuit, (), (fe(3), fe(3))).unwrap();
    assert_eq!(*nine.public_output(), fe(9));
    assert!(backend.verify(&nine, &mul_vk));

    // add(4, proof_of_9, mul_vk): 9 != 0, so the product proof is verified.
    let bound = add.binder().bind(nine).unwrap();
    let thirteen = backend
        .prove(&add, fe(4), AddWitness { proof: bound, key: mul_vk })
        .unwrap();
    assert_eq!(*thirteen.public_output(), fe(13));
    assert!(backend.verify(&thirteen, &add_vk));
}

#[test]
fn base_case_and_product_prove_in_parallel() {
    let (backend, mul_vk, add) = setup();
    let dummy = add.binder().bind(Proof::dummy((), fe(0), 0)).unwrap();
    let (base, nine) = rayon::join(
        || backend.prove(&add, fe(5), AddWitness { proof: dummy, key: mul_vk.clone() }),
        || backend.prove(&MultiplyCircuit, (), (fe(3), fe(3))),
    );
    assert_eq!(*base.unwrap().public_output(), fe(5));
    assert_eq!(*nine.unwrap().public_output(), fe(9));
}

#[test]
fn product_from_untrusted_circuit_rejected() {
    let (backend, _mul_vk, add) = setup();
    let add_vk = backend.compile(&add).unwrap();
    let placeholder = add.binder().bind(Proof::dummy((), fe(0), 0)).unwrap();
    let err = backend
        .prove(&add, fe(1), AddWitness { proof: placeholder, key: add_vk })
        .unwrap_err();
    assert!(matches!(err, ZkError::UntrustedKey { .. }));
}

#[test]
fn tampered_product_rejected() {
    let (backend, mul_vk, add) = setup();
    let nine = backend.prove(&MultiplyCircuit, (), (fe(3), fe(3))).unwrap();
    // Same origin metadata, different claimed output.
    let forged: Proof<(), FieldElement> = serde_json::from_value({
        let mut v = serde_json::to_value(&nine).unwrap();
        v["public_output"] = serde_json::json!(10);
        v
    })
    .unwrap();
    let bound = add.binder().bind(forged).unwrap();
    let err = backend
        .prove(&add, fe(4), AddWitness { proof: bound, key: mul_vk })
        .unwrap_err();
    assert!(matches!(err, ZkError::ProofInvalid(_)));
}

#[test]
fn allowlist_equivalence_over_compiled_keys() {
    let (backend, mul_vk, add) = setup();
    let add_vk = backend.compile(&add).unwrap();
    let list = Allowlist::for_key(&mul_vk);
    for k in [&mul_vk, &add_vk] {
        assert_eq!(list.is_trusted(k, &()), k.hash() == list.trusted_hash());
    }
}

#[test]
fn driver_reports_same_numbers() {
    let report = sideload_cli::allowlist::run_allowlist(
        &sideload_cli::allowlist::AllowlistArgs::default(),
        ProofPolicy::development(),
    )
    .unwrap();
    assert_eq!(
        (report.base_output, report.product, report.total),
        (fe(5), fe(9), fe(13))
    );
}
