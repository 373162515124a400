//! # Bulwark Common
//!
//! Shared types, errors, and constants used across Bulwark components.
//!
//! ## Modules
//! - `types` - Verification data model (credentials, requests, verdicts, providers)
//! - `error` - Common error types
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod types;

pub use error::BulwarkError;
pub use types::*;
