//! # attest-zkp — Proof Verification Boundary
//!
//! The zero-knowledge circuit and its cryptographic verifier live outside
//! this workspace. What the attesters consume is a single capability:
//!
//! ```text
//! verify(proof, publicInputs[]) -> bool | VerifyError
//! ```
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): [`ProofVerifier`] is the verification
//!   capability. [`VerifyError`] distinguishes a public input that exceeds
//!   the scalar field from a proof that is simply invalid; attesters
//!   propagate the sub-reason unchanged.
//!
//! - **Public inputs** (`public_inputs.rs`): [`ProofPublicInputs`] names the
//!   ten slots of the membership circuit's public-input vector.
//!
//! - **Mock** (`mock.rs`): [`MockProofSystem`] produces deterministic,
//!   transparent "proofs" (a SHA-256 digest of the inputs). It provides no
//!   zero-knowledge guarantees and exists for development and tests.

pub mod proof;
pub mod public_inputs;
pub mod traits;

#[cfg(feature = "mock")]
pub mod mock;

// Re-export primary types.
#[cfg(feature = "mock")]
pub use mock::MockProofSystem;
pub use proof::{Proof, ProofData};
pub use public_inputs::ProofPublicInputs;
pub use traits::{ProofError, ProofVerifier, VerifyError};
