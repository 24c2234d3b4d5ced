//! # Allowlist Subcommand
//!
//! Runs the single-trusted-key flow:
//!
//! 1. compile `multiply` and bake its key hash into `add`'s allowlist;
//! 2. prove the base case `add(base, dummy)` and `multiply(a, b)` in
//!    parallel (they share nothing but the key);
//! 3. prove `add(addend, product)`, which verifies the product proof.
//!
//! With the defaults this yields 5, 9, and 13.

use anyhow::{ensure, Context, Result};
use clap::Args;
use serde::Serialize;

use sideload_chain::{AddCircuit, AddWitness, MultiplyCircuit};
use sideload_core::FieldElement;
use sideload_zkp::{
    Allowlist, CapabilityProfile, DynamicProofBinder, MockProofSystem, Proof, ProofPolicy,
    ProofSystem,
};

/// Arguments for `sideload allowlist`.
#[derive(Args, Debug, Clone)]
pub struct AllowlistArgs {
    /// Public input of the base-case addition.
    #[arg(long, default_value_t = 5)]
    pub base: u64,

    /// The two private factors proven by `multiply`.
    #[arg(long, num_args = 2, value_names = ["A", "B"], default_values_t = [3, 3])]
    pub factors: Vec<u64>,

    /// Public input of the addition that consumes the product.
    #[arg(long, default_value_t = 4)]
    pub addend: u64,
}

impl Default for AllowlistArgs {
    fn default() -> Self {
        Self {
            base: 5,
            factors: vec![3, 3],
            addend: 4,
        }
    }
}

/// Outcome of the allowlist flow.
#[derive(Debug, Clone, Serialize)]
pub struct AllowlistReport {
    pub multiply_key: FieldElement,
    pub add_key: FieldElement,
    /// Output of the base case (dummy product, skipped).
    pub base_output: FieldElement,
    /// Output of `multiply`.
    pub product: FieldElement,
    /// Output of the addition that verified the product.
    pub total: FieldElement,
    /// Whether the final proof verifies against `add_key`.
    pub verified: bool,
}

/// Execute the allowlist flow.
pub fn run_allowlist(args: &AllowlistArgs, policy: ProofPolicy) -> Result<AllowlistReport> {
    let (a, b) = match args.factors.as_slice() {
        [a, b] => (FieldElement::new(*a), FieldElement::new(*b)),
        other => anyhow::bail!("expected two factors, got {}", other.len()),
    };
    let backend = MockProofSystem::new();

    let mul_vk = backend
        .compile(&MultiplyCircuit)
        .context("compiling multiply")?;
    let add = AddCircuit::new(
        Allowlist::for_key(&mul_vk),
        DynamicProofBinder::new(CapabilityProfile::from_keys([&mul_vk]), policy),
    );
    let add_vk = backend.compile(&add).context("compiling add")?;
    tracing::info!(multiply = %mul_vk.hash(), add = %add_vk.hash(), "compiled");

    let dummy = add
        .binder()
        .bind(Proof::dummy((), FieldElement::ZERO, 0))
        .context("binding base-case placeholder")?;
    let (base, product) = rayon::join(
        || {
            backend.prove(
                &add,
                FieldElement::new(args.base),
                AddWitness {
                    proof: dummy,
                    key: mul_vk.clone(),
                },
            )
        },
        || backend.prove(&MultiplyCircuit, (), (a, b)),
    );
    let base = base.context("proving base case")?;
    let product = product.context("proving multiply")?;
    tracing::info!(output = %base.public_output(), "base case");
    tracing::info!(output = %product.public_output(), "multiply");

    let product_output = *product.public_output();
    let bound = add.binder().bind(product).context("binding product proof")?;
    let total = backend
        .prove(
            &add,
            FieldElement::new(args.addend),
            AddWitness {
                proof: bound,
                key: mul_vk.clone(),
            },
        )
        .context("proving addition over product")?;
    let verified = backend.verify(&total, &add_vk);
    ensure!(verified, "final addition proof does not verify");
    tracing::info!(output = %total.public_output(), "add");

    Ok(AllowlistReport {
        multiply_key: mul_vk.hash(),
        add_key: add_vk.hash(),
        base_output: *base.public_output(),
        product: product_output,
        total: *total.public_output(),
        verified,
    })
}
