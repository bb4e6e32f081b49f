//! # Requests and Claims
//!
//! A [`Request`] asks an attester to attest `destination`. It carries one
//! [`Claim`]: the declared group id, the claimed value, and the group's
//! encoded properties. The group id must be the hash of the properties;
//! [`Claim::for_group`] builds a consistent claim from typed properties.

use attest_core::{Address, FieldElement, GroupProperties, ValidationError};
use serde::{Deserialize, Serialize};

/// A claim about membership in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Declared group id.
    pub group_id: FieldElement,
    /// Value the claimant asserts (a score, or a strict membership value).
    pub claimed_value: u128,
    /// Encoded [`GroupProperties`].
    #[serde(with = "attest_core::attestation::hex_bytes")]
    pub encoded_properties: Vec<u8>,
}

impl Claim {
    /// A claim whose group id and encoding both come from `properties`.
    pub fn for_group(properties: &GroupProperties, claimed_value: u128) -> Self {
        Self {
            group_id: *properties.group_id().as_field(),
            claimed_value,
            encoded_properties: properties.encode(),
        }
    }

    /// Decode the properties.
    pub fn properties(&self) -> Result<GroupProperties, ValidationError> {
        GroupProperties::decode(&self.encoded_properties)
    }
}

/// A request for attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Claims; exactly one is accepted.
    pub claims: Vec<Claim>,
    /// Account that receives the attestation.
    pub destination: Address,
}

impl Request {
    /// A request with a single claim.
    pub fn single(claim: Claim, destination: Address) -> Self {
        Self {
            claims: vec![claim],
            destination,
        }
    }

    /// The only claim.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ClaimsLengthNotOne`] for zero or several claims.
    pub fn sole_claim(&self) -> Result<&Claim, ValidationError> {
        match self.claims.as_slice() {
            [claim] => Ok(claim),
            other => Err(ValidationError::ClaimsLengthNotOne(other.len())),
        }
    }
}
