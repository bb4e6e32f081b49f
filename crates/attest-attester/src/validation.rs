//! # Claim Validation Pipeline
//!
//! Shared by every proof-gated attester variant. Runs, in order, failing
//! fast on the first problem:
//!
//! 1. **Shape.** Exactly one claim; properties decode.
//! 2. **Bounds.** `collectionId = first + groupIndex` must lie in
//!    `[first, last]`.
//! 3. **Group binding.** The declared group id must equal
//!    `keccak256(encodedProperties) mod p`.
//! 4. **Public-input cross-checks.** Destination, chain id, claimed value,
//!    accounts tree value against the group id, `isStrict` against
//!    `!isScore`, external nullifier, registry root, commitment-mapper key.
//! 5. **Verification.** The full public-input vector goes to the
//!    [`ProofVerifier`]; its error is returned unchanged, and a proof that
//!    does not verify becomes [`VerifyError::InvalidProof`].
//!
//! The pipeline reads collaborator state but mutates nothing.

use std::sync::Arc;

use attest_core::group::group_id_from_encoded;
use attest_core::{
    external_nullifier, Address, CollectionId, CollectionRange, CrossCheckError, FieldElement,
    GroupProperties, ValidationError,
};
use attest_registry::{CommitmentMapperRegistry, RootsRegistry};
use attest_zkp::{ProofData, ProofPublicInputs, ProofVerifier, VerifyError};

use crate::error::AttesterError;
use crate::request::Request;

/// Outcome of a successful validation: everything a variant needs to
/// build its attestation and run its nullifier policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaim {
    /// Account that receives the attestation.
    pub destination: Address,
    /// Derived collection id.
    pub collection_id: CollectionId,
    /// Decoded group properties.
    pub properties: GroupProperties,
    /// Claimed value.
    pub claimed_value: u128,
    /// Nullifier from the proof.
    pub nullifier: FieldElement,
}

/// Read-only capabilities the pipeline consults.
#[derive(Clone)]
pub struct ClaimValidator {
    attester: Address,
    chain_id: u64,
    window: CollectionRange,
    roots: Arc<dyn RootsRegistry>,
    commitment_mapper: Arc<dyn CommitmentMapperRegistry>,
    verifier: Arc<dyn ProofVerifier>,
}

impl std::fmt::Debug for ClaimValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimValidator")
            .field("attester", &self.attester)
            .field("chain_id", &self.chain_id)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl ClaimValidator {
    /// Build a validator for `attester` writing into `window` on `chain_id`.
    pub fn new(
        attester: Address,
        chain_id: u64,
        window: CollectionRange,
        roots: Arc<dyn RootsRegistry>,
        commitment_mapper: Arc<dyn CommitmentMapperRegistry>,
        verifier: Arc<dyn ProofVerifier>,
    ) -> Self {
        Self {
            attester,
            chain_id,
            window,
            roots,
            commitment_mapper,
            verifier,
        }
    }

    /// The attester identity checks are performed for.
    pub fn attester(&self) -> Address {
        self.attester
    }

    /// The authorized window.
    pub fn window(&self) -> CollectionRange {
        self.window
    }

    /// `first + group_index`, if it stays within the window.
    pub fn collection_id_for(&self, group_index: u128) -> Result<CollectionId, ValidationError> {
        let first = self.window.min;
        match first.checked_offset(group_index) {
            Some(id) if id <= self.window.max => Ok(id),
            derived => Err(ValidationError::CollectionIdOutOfBound {
                collection_id: derived.unwrap_or(CollectionId::new(u128::MAX)),
                first,
                last: self.window.max,
            }),
        }
    }

    /// Run the full pipeline.
    pub fn validate(&self, request: &Request, proof: &ProofData) -> Result<VerifiedClaim, AttesterError> {
        let claim = request.sole_claim()?;
        let properties = claim.properties()?;

        let collection_id = self.collection_id_for(properties.group_index)?;

        let recomputed = group_id_from_encoded(&claim.encoded_properties);
        if *recomputed.as_field() != claim.group_id {
            return Err(ValidationError::GroupIdAndPropertiesMismatch {
                expected: *recomputed.as_field(),
                declared: claim.group_id,
            }
            .into());
        }
        tracing::debug!(
            attester = %self.attester,
            group_index = properties.group_index,
            collection_id = %collection_id,
            "claim shape and group binding checked"
        );

        let inputs = ProofPublicInputs::from_slice(&proof.public_inputs)?;
        self.cross_check(request.destination, claim.claimed_value, claim.group_id, &properties, &inputs)?;
        tracing::debug!(attester = %self.attester, "public inputs cross-checked");

        if !self.verifier.verify(&proof.proof, &proof.public_inputs)? {
            return Err(VerifyError::InvalidProof(
                "proof does not verify against its public inputs".to_string(),
            )
            .into());
        }
        tracing::debug!(attester = %self.attester, nullifier = %inputs.nullifier, "proof verified");

        Ok(VerifiedClaim {
            destination: request.destination,
            collection_id,
            properties,
            claimed_value: claim.claimed_value,
            nullifier: inputs.nullifier,
        })
    }

    fn cross_check(
        &self,
        destination: Address,
        claimed_value: u128,
        group_id: FieldElement,
        properties: &GroupProperties,
        inputs: &ProofPublicInputs,
    ) -> Result<(), CrossCheckError> {
        if inputs.destination != FieldElement::from_address(&destination) {
            return Err(CrossCheckError::DestinationMismatch {
                expected: destination,
                actual: inputs.destination,
            });
        }
        if inputs.chain_id != FieldElement::from_u64(self.chain_id) {
            return Err(CrossCheckError::ChainIdMismatch {
                expected: self.chain_id,
                actual: inputs.chain_id,
            });
        }
        if inputs.claimed_value != FieldElement::from_u128(claimed_value) {
            return Err(CrossCheckError::ValueMismatch {
                expected: claimed_value,
                actual: inputs.claimed_value,
            });
        }
        if inputs.accounts_tree_value != group_id {
            return Err(CrossCheckError::AccountsTreeValueMismatch {
                expected: group_id,
                actual: inputs.accounts_tree_value,
            });
        }
        let strict = !properties.is_score;
        if inputs.is_strict != FieldElement::from(strict) {
            return Err(CrossCheckError::IsStrictMismatch {
                expected: strict,
                actual: inputs.is_strict,
            });
        }
        let expected_nullifier = external_nullifier(&self.attester, properties.group_index);
        if inputs.external_nullifier != expected_nullifier {
            return Err(CrossCheckError::ExternalNullifierMismatch {
                expected: expected_nullifier,
                actual: inputs.external_nullifier,
            });
        }
        if !self
            .roots
            .is_root_available_for_attester(&self.attester, &inputs.registry_root)
        {
            return Err(CrossCheckError::RegistryRootNotAvailable {
                attester: self.attester,
                root: inputs.registry_root,
            });
        }
        let [expected_x, expected_y] = self.commitment_mapper.public_key();
        let [actual_x, actual_y] = inputs.commitment_mapper_pub_key;
        if (expected_x, expected_y) != (actual_x, actual_y) {
            return Err(CrossCheckError::CommitmentMapperPubKeyMismatch {
                expected_x,
                expected_y,
                actual_x,
                actual_y,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Claim;
    use attest_core::{AttestError, EventLog};
    use attest_registry::{AvailableRootsRegistry, InMemoryCommitmentMapper};
    use attest_zkp::MockProofSystem;

    const OWNER: Address = Address::repeat_byte(0x01);
    const ATTESTER: Address = Address::repeat_byte(0xa7);
    const DEST: Address = Address::repeat_byte(0xd1);
    const CHAIN: u64 = 31337;

    fn root() -> FieldElement {
        FieldElement::from_u64(0x5eed)
    }

    fn mapper_key() -> [FieldElement; 2] {
        [FieldElement::from_u64(11), FieldElement::from_u64(22)]
    }

    fn validator() -> ClaimValidator {
        let roots = AvailableRootsRegistry::new(OWNER, EventLog::new());
        roots.register_root_for_attester(&OWNER, ATTESTER, root()).unwrap();
        let mapper = InMemoryCommitmentMapper::new(OWNER, mapper_key(), EventLog::new());
        ClaimValidator::new(
            ATTESTER,
            CHAIN,
            CollectionRange::new(1_000u128, 1_010u128).unwrap(),
            Arc::new(roots),
            Arc::new(mapper),
            Arc::new(MockProofSystem),
        )
    }

    fn props() -> GroupProperties {
        GroupProperties::new(5, 1_700_000_000, false)
    }

    fn honest_inputs(props: &GroupProperties, value: u128) -> ProofPublicInputs {
        ProofPublicInputs {
            destination: FieldElement::from_address(&DEST),
            chain_id: FieldElement::from_u64(CHAIN),
            commitment_mapper_pub_key: mapper_key(),
            registry_root: root(),
            external_nullifier: external_nullifier(&ATTESTER, props.group_index),
            nullifier: FieldElement::from_u64(0xabc),
            claimed_value: FieldElement::from_u128(value),
            accounts_tree_value: *props.group_id().as_field(),
            is_strict: FieldElement::from(!props.is_score),
        }
    }

    fn submit(inputs: ProofPublicInputs, claim: Claim) -> Result<VerifiedClaim, AttesterError> {
        let proof = MockProofSystem.prove(&inputs.to_vec()).unwrap();
        validator().validate(&Request::single(claim, DEST), &proof)
    }

    fn cross_check_of(result: Result<VerifiedClaim, AttesterError>) -> CrossCheckError {
        result.unwrap_err().as_cross_check().cloned().unwrap()
    }

    #[test]
    fn honest_claim_passes() {
        let verified = submit(honest_inputs(&props(), 7), Claim::for_group(&props(), 7)).unwrap();
        assert_eq!(verified.collection_id, CollectionId::new(1_005));
        assert_eq!(verified.claimed_value, 7);
        assert_eq!(verified.nullifier, FieldElement::from_u64(0xabc));
        assert_eq!(verified.destination, DEST);
    }

    #[test]
    fn collection_id_window_is_inclusive() {
        let v = validator();
        assert_eq!(v.collection_id_for(10).unwrap(), CollectionId::new(1_010));
        let err = v.collection_id_for(11).unwrap_err();
        assert_eq!(
            err,
            ValidationError::CollectionIdOutOfBound {
                collection_id: CollectionId::new(1_011),
                first: CollectionId::new(1_000),
                last: CollectionId::new(1_010),
            }
        );
        assert!(v.collection_id_for(u128::MAX).is_err());
    }

    #[test]
    fn tampered_properties_rejected() {
        let mut claim = Claim::for_group(&props(), 7);
        claim.encoded_properties = GroupProperties::new(5, 1_700_000_001, false).encode();
        let err = submit(honest_inputs(&props(), 7), claim).unwrap_err();
        assert!(matches!(
            err,
            AttesterError::Attest(AttestError::Validation(
                ValidationError::GroupIdAndPropertiesMismatch { .. }
            ))
        ));
    }

    #[test]
    fn destination_checked_first() {
        let mut inputs = honest_inputs(&props(), 7);
        inputs.destination = FieldElement::from_address(&Address::repeat_byte(0xee));
        inputs.chain_id = FieldElement::from_u64(1);
        assert!(matches!(
            cross_check_of(submit(inputs, Claim::for_group(&props(), 7))),
            CrossCheckError::DestinationMismatch { expected: DEST, .. }
        ));
    }

    #[test]
    fn chain_id_mismatch() {
        let mut inputs = honest_inputs(&props(), 7);
        inputs.chain_id = FieldElement::from_u64(1);
        assert!(matches!(
            cross_check_of(submit(inputs, Claim::for_group(&props(), 7))),
            CrossCheckError::ChainIdMismatch { expected: CHAIN, .. }
        ));
    }

    #[test]
    fn value_mismatch() {
        let inputs = honest_inputs(&props(), 8);
        assert_eq!(
            cross_check_of(submit(inputs, Claim::for_group(&props(), 7))),
            CrossCheckError::ValueMismatch {
                expected: 7,
                actual: FieldElement::from_u64(8)
            }
        );
    }

    #[test]
    fn accounts_tree_value_mismatch() {
        let mut inputs = honest_inputs(&props(), 7);
        inputs.accounts_tree_value = FieldElement::from_u64(1);
        assert!(matches!(
            cross_check_of(submit(inputs, Claim::for_group(&props(), 7))),
            CrossCheckError::AccountsTreeValueMismatch { .. }
        ));
    }

    #[test]
    fn strictness_must_match_score_flag() {
        let mut inputs = honest_inputs(&props(), 7);
        inputs.is_strict = FieldElement::ZERO;
        assert_eq!(
            cross_check_of(submit(inputs, Claim::for_group(&props(), 7))),
            CrossCheckError::IsStrictMismatch {
                expected: true,
                actual: FieldElement::ZERO
            }
        );
    }

    #[test]
    fn external_nullifier_bound_to_attester() {
        let mut inputs = honest_inputs(&props(), 7);
        inputs.external_nullifier = external_nullifier(&Address::repeat_byte(0x99), 5);
        assert!(matches!(
            cross_check_of(submit(inputs, Claim::for_group(&props(), 7))),
            CrossCheckError::ExternalNullifierMismatch { .. }
        ));
    }

    #[test]
    fn untrusted_root_rejected() {
        let mut inputs = honest_inputs(&props(), 7);
        inputs.registry_root = FieldElement::from_u64(1);
        assert_eq!(
            cross_check_of(submit(inputs, Claim::for_group(&props(), 7))),
            CrossCheckError::RegistryRootNotAvailable {
                attester: ATTESTER,
                root: FieldElement::from_u64(1)
            }
        );
    }

    #[test]
    fn stale_commitment_mapper_key_rejected() {
        let mut inputs = honest_inputs(&props(), 7);
        inputs.commitment_mapper_pub_key[1] = FieldElement::from_u64(23);
        assert!(matches!(
            cross_check_of(submit(inputs, Claim::for_group(&props(), 7))),
            CrossCheckError::CommitmentMapperPubKeyMismatch { .. }
        ));
    }

    #[test]
    fn forged_proof_rejected() {
        let inputs = honest_inputs(&props(), 7);
        let mut proof = MockProofSystem.prove(&inputs.to_vec()).unwrap();
        proof.proof.a[0] = FieldElement::ONE;
        let err = validator()
            .validate(&Request::single(Claim::for_group(&props(), 7), DEST), &proof)
            .unwrap_err();
        assert!(matches!(err, AttesterError::Proof(VerifyError::InvalidProof(_))));
    }

    #[test]
    fn out_of_field_nullifier_reported_by_verifier() {
        let mut inputs = honest_inputs(&props(), 7);
        inputs.nullifier = FieldElement::scalar_field_modulus();
        let proof = MockProofSystem.prove_unchecked(&inputs.to_vec());
        let err = validator()
            .validate(&Request::single(Claim::for_group(&props(), 7), DEST), &proof)
            .unwrap_err();
        assert!(matches!(
            err,
            AttesterError::Proof(VerifyError::PublicInputExceedsField { index: 6, .. })
        ));
    }

    #[test]
    fn wrong_input_count_rejected() {
        let inputs = honest_inputs(&props(), 7).to_vec();
        let proof = MockProofSystem.prove(&inputs[..9]).unwrap();
        let err = validator()
            .validate(&Request::single(Claim::for_group(&props(), 7), DEST), &proof)
            .unwrap_err();
        assert!(matches!(
            err,
            AttesterError::Attest(AttestError::Validation(ValidationError::PublicInputsLength {
                expected: 10,
                actual: 9
            }))
        ));
    }
}
