//! # Proof Payloads
//!
//! A Groth16-shaped proof (points `a`, `b`, `c`) together with the public
//! input vector it was produced for. Attesters receive a [`ProofData`] and
//! read the public inputs back through
//! [`ProofPublicInputs`](crate::ProofPublicInputs).

use attest_core::FieldElement;
use serde::{Deserialize, Serialize};

/// The proof points. Coordinates are scalar-field-sized words.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Proof {
    /// G1 point `a`.
    pub a: [FieldElement; 2],
    /// G2 point `b`.
    pub b: [[FieldElement; 2]; 2],
    /// G1 point `c`.
    pub c: [FieldElement; 2],
}

/// A proof and the public inputs it commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofData {
    /// The proof points.
    pub proof: Proof,
    /// The public-input vector.
    pub public_inputs: Vec<FieldElement>,
}
