//! # Mock Proof System
//!
//! A deterministic, transparent proof system for development and testing.
//! Produces SHA-256-based "proofs" that are verifiable but provide **no
//! zero-knowledge guarantees**.
//!
//! ## How It Works
//!
//! - `prove()` computes `SHA256(domain || input_0 || ... || input_n)`,
//!   reduces it into the scalar field and places it in `a.x`. Every other
//!   coordinate is zero.
//! - `verify()` rejects out-of-field inputs, then recomputes the digest and
//!   checks the whole proof for equality.
//!
//! ## Security Warning
//!
//! **NOT PRIVATE.** Anyone can recompute a mock proof from its public inputs.

use attest_core::FieldElement;
use sha2::{Digest, Sha256};

use crate::proof::{Proof, ProofData};
use crate::traits::{ensure_inputs_in_field, ProofError, ProofVerifier, VerifyError};

const DOMAIN: &[u8] = b"attest-mock-proof-v1";

/// Deterministic mock prover and verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProofSystem;

impl MockProofSystem {
    /// Produce a mock proof binding `public_inputs`.
    ///
    /// # Errors
    ///
    /// [`ProofError::InvalidInputs`] if any input lies outside the scalar
    /// field; a real prover could not produce such a witness either.
    pub fn prove(&self, public_inputs: &[FieldElement]) -> Result<ProofData, ProofError> {
        ensure_inputs_in_field(public_inputs)
            .map_err(|e| ProofError::InvalidInputs(e.to_string()))?;
        Ok(ProofData {
            proof: Self::expected_proof(public_inputs),
            public_inputs: public_inputs.to_vec(),
        })
    }

    /// Produce proof points for arbitrary inputs, skipping the field check.
    ///
    /// Lets tests exercise the verifier's out-of-field rejection.
    pub fn prove_unchecked(&self, public_inputs: &[FieldElement]) -> ProofData {
        ProofData {
            proof: Self::expected_proof(public_inputs),
            public_inputs: public_inputs.to_vec(),
        }
    }

    fn expected_proof(public_inputs: &[FieldElement]) -> Proof {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN);
        for input in public_inputs {
            hasher.update(input.as_bytes());
        }
        let digest = FieldElement::reduce(&hasher.finalize());
        Proof {
            a: [digest, FieldElement::ZERO],
            ..Proof::default()
        }
    }
}

impl ProofVerifier for MockProofSystem {
    fn verify(&self, proof: &Proof, public_inputs: &[FieldElement]) -> Result<bool, VerifyError> {
        ensure_inputs_in_field(public_inputs)?;
        let valid = *proof == Self::expected_proof(public_inputs);
        tracing::trace!(valid, inputs = public_inputs.len(), "mock proof verified");
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> Vec<FieldElement> {
        (1..=10u64).map(FieldElement::from_u64).collect()
    }

    #[test]
    fn prove_then_verify_roundtrip() {
        let sys = MockProofSystem;
        let data = sys.prove(&inputs()).unwrap();
        assert!(sys.verify(&data.proof, &data.public_inputs).unwrap());
    }

    #[test]
    fn prove_is_deterministic() {
        let sys = MockProofSystem;
        assert_eq!(sys.prove(&inputs()).unwrap(), sys.prove(&inputs()).unwrap());
    }

    #[test]
    fn verify_rejects_tampered_inputs() {
        let sys = MockProofSystem;
        let data = sys.prove(&inputs()).unwrap();
        let mut tampered = data.public_inputs.clone();
        tampered[7] = FieldElement::from_u64(1_000);
        assert!(!sys.verify(&data.proof, &tampered).unwrap());
    }

    #[test]
    fn verify_rejects_tampered_proof() {
        let sys = MockProofSystem;
        let mut data = sys.prove(&inputs()).unwrap();
        data.proof.c[0] = FieldElement::ONE;
        assert!(!sys.verify(&data.proof, &data.public_inputs).unwrap());
    }

    #[test]
    fn prove_rejects_out_of_field_input() {
        let mut bad = inputs();
        bad[4] = FieldElement::scalar_field_modulus();
        let err = MockProofSystem.prove(&bad).unwrap_err();
        assert!(matches!(err, ProofError::InvalidInputs(msg) if msg.contains("public input 4")));
    }

    #[test]
    fn verify_reports_out_of_field_input() {
        let mut bad = inputs();
        bad[2] = FieldElement::from_be_bytes([0xff; 32]);
        let data = MockProofSystem.prove_unchecked(&bad);
        let err = MockProofSystem
            .verify(&data.proof, &data.public_inputs)
            .unwrap_err();
        assert!(matches!(err, VerifyError::PublicInputExceedsField { index: 2, .. }));
    }

    #[test]
    fn proof_data_serialization_roundtrip() {
        let data = MockProofSystem.prove(&inputs()).unwrap();
        let json = serde_json::to_string(&data).unwrap();
        let back: ProofData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
