//! # Proof Verifier Trait
//!
//! The abstract interface attesters use to check a proof against its public
//! inputs. Implementations are stateless from the caller's point of view
//! and must be `Send + Sync` so one verifier can back many attesters.

use attest_core::FieldElement;
use thiserror::Error;

use crate::proof::Proof;

/// Error during proof generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The circuit inputs are invalid.
    #[error("invalid circuit inputs: {0}")]
    InvalidInputs(String),
}

/// Error during proof verification.
///
/// Attesters surface these unchanged so a prover can tell a malformed
/// public input apart from a bad proof.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// A public input is not a canonical scalar-field element.
    #[error("public input {index} exceeds the scalar field: {value}")]
    PublicInputExceedsField {
        /// Position in the public-input vector.
        index: usize,
        /// The offending word.
        value: FieldElement,
    },
    /// The proof does not verify against the public inputs.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
}

/// Verification capability for membership proofs.
pub trait ProofVerifier: Send + Sync {
    /// Verify `proof` against `public_inputs`.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the proof is valid, `Ok(false)` if it is well-formed but
    /// does not verify.
    ///
    /// # Errors
    ///
    /// [`VerifyError::PublicInputExceedsField`] if any input is `>= p`.
    fn verify(&self, proof: &Proof, public_inputs: &[FieldElement]) -> Result<bool, VerifyError>;
}

/// Reject the first public input that is not a canonical field element.
pub fn ensure_inputs_in_field(public_inputs: &[FieldElement]) -> Result<(), VerifyError> {
    match public_inputs
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_in_scalar_field())
    {
        Some((index, value)) => Err(VerifyError::PublicInputExceedsField {
            index,
            value: *value,
        }),
        None => Ok(()),
    }
}
