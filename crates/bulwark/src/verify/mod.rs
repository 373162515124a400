//! Server-side verification of challenge-response tokens.
//!
//! The gate is framework-agnostic: it takes credentials explicitly at call
//! time and knows nothing about HTTP routing or storage.

mod gate;

pub use gate::{GateError, VerificationGate};
