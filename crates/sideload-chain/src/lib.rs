//! # sideload-chain — Recursive Chain State
//!
//! Threads a `{ registry_root, value }` pair through an arbitrary-length
//! chain of recursive proofs.
//!
//! ## Modules
//!
//! - **State** (`state.rs`): [`ChainState`], its two pure transitions
//!   (`registry_update`, `validate`), and [`ChainLink`], the connection of
//!   a step to its predecessor.
//!
//! - **Circuit** (`circuit.rs`): [`ChainCircuit`], which runs one
//!   transition per proof and verifies the previous step's proof against
//!   its own key.
//!
//! - **Circuits** (`circuits/`): `multiply`, the allowlisted `add`, and the
//!   registry-backed program circuits.
//!
//! ## Design
//!
//! There is no ambient registry. The registry is the root carried in the
//! state, and the tree behind it belongs to whoever drives the chain.
//! Independent chains never share anything.

pub mod circuit;
pub mod circuits;
pub mod state;

pub use circuit::{ChainCircuit, ChainStep, CHAIN_CIRCUIT};
pub use circuits::{AddCircuit, AddWitness, MultiplyCircuit, ProgramCircuit, ProgramOp};
pub use state::{ChainLink, ChainProof, ChainState};
