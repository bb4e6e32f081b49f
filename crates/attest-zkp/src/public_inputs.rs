//! # Membership Circuit Public Inputs
//!
//! The circuit exposes ten public inputs, in this order:
//!
//! | Slot | Name                         | Checked against                          |
//! |------|------------------------------|------------------------------------------|
//! | 0    | destination                  | claim destination                        |
//! | 1    | chainId                      | executing chain                          |
//! | 2    | commitmentMapperPubKey.x     | commitment-mapper registry               |
//! | 3    | commitmentMapperPubKey.y     | commitment-mapper registry               |
//! | 4    | registryRoot                 | roots registry (trusted for attester)    |
//! | 5    | externalNullifier            | `H(attester, groupIndex)`                |
//! | 6    | nullifier                    | (the proof-derived identity token)       |
//! | 7    | claimedValue                 | claim value                              |
//! | 8    | accountsTreeValue            | claim groupId                            |
//! | 9    | isStrict                     | `!isScore`                               |
//!
//! Fields hold raw words; interpreting them (as an address, a `u64`, a flag)
//! is the attester's job so that mismatches can be reported with the exact
//! word the prover supplied.

use attest_core::{FieldElement, ValidationError};
use serde::{Deserialize, Serialize};

/// Named view of the public-input vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofPublicInputs {
    /// Slot 0.
    pub destination: FieldElement,
    /// Slot 1.
    pub chain_id: FieldElement,
    /// Slots 2 and 3.
    pub commitment_mapper_pub_key: [FieldElement; 2],
    /// Slot 4.
    pub registry_root: FieldElement,
    /// Slot 5.
    pub external_nullifier: FieldElement,
    /// Slot 6.
    pub nullifier: FieldElement,
    /// Slot 7.
    pub claimed_value: FieldElement,
    /// Slot 8.
    pub accounts_tree_value: FieldElement,
    /// Slot 9.
    pub is_strict: FieldElement,
}

impl ProofPublicInputs {
    /// Number of public inputs.
    pub const LEN: usize = 10;

    /// Flatten into the circuit's ordering.
    pub fn to_vec(&self) -> Vec<FieldElement> {
        vec![
            self.destination,
            self.chain_id,
            self.commitment_mapper_pub_key[0],
            self.commitment_mapper_pub_key[1],
            self.registry_root,
            self.external_nullifier,
            self.nullifier,
            self.claimed_value,
            self.accounts_tree_value,
            self.is_strict,
        ]
    }

    /// Read a public-input vector.
    ///
    /// # Errors
    ///
    /// [`ValidationError::PublicInputsLength`] unless exactly ten inputs are
    /// supplied.
    pub fn from_slice(inputs: &[FieldElement]) -> Result<Self, ValidationError> {
        if inputs.len() != Self::LEN {
            return Err(ValidationError::PublicInputsLength {
                expected: Self::LEN,
                actual: inputs.len(),
            });
        }
        Ok(Self {
            destination: inputs[0],
            chain_id: inputs[1],
            commitment_mapper_pub_key: [inputs[2], inputs[3]],
            registry_root: inputs[4],
            external_nullifier: inputs[5],
            nullifier: inputs[6],
            claimed_value: inputs[7],
            accounts_tree_value: inputs[8],
            is_strict: inputs[9],
        })
    }
}
