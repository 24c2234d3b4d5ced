//! # Demo Circuits
//!
//! Small circuits the driver composes into the two end-to-end flows.
//!
//! - **Arithmetic** (`arithmetic.rs`): `multiply`, and `add`, which
//!   sideloads a `multiply` proof through an allowlist.
//! - **Programs** (`program.rs`): one-step field programs registered in a
//!   Merkle registry and validated by the chain circuit.

pub mod arithmetic;
pub mod program;

pub use arithmetic::{AddCircuit, AddWitness, MultiplyCircuit};
pub use program::{ProgramCircuit, ProgramOp};
