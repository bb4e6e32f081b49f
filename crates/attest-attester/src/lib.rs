//! # attest-attester — Proof-Gated Attesters
//!
//! An attester turns a claim plus a zero-knowledge membership proof into an
//! attestation recorded in the registry.
//!
//! ## Pipeline
//!
//! 1. [`ClaimValidator`] (`validation.rs`) checks the claim and every proof
//!    public input against the request, the attester's window, the roots
//!    registry and the commitment-mapper key, then calls the verifier.
//! 2. The variant's nullifier policy (`nullifier.rs`) plans the transition
//!    without mutating anything.
//! 3. The registry applies the delete/record batch atomically.
//! 4. Only then is the nullifier table updated and events emitted.
//!
//! ## Variants
//!
//! - [`SimpleAttester`]: a nullifier is bound to one destination forever.
//! - [`AccountboundAttester`]: a nullifier may move to a new destination
//!   after a per-group cooldown; each move burns the old attestation.

pub mod accountbound;
pub mod attester;
pub mod config;
pub mod error;
pub mod nullifier;
pub mod request;
pub mod simple;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use accountbound::AccountboundAttester;
pub use attester::{Attester, Collaborators};
pub use config::{AttesterConfig, ConfigError};
pub use error::AttesterError;
pub use nullifier::{NullifierRecord, NullifierTable, Transition, TransitionPlan};
pub use request::{Claim, Request};
pub use simple::SimpleAttester;
pub use validation::{ClaimValidator, VerifiedClaim};
