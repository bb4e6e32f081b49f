//! # Attester Capability
//!
//! The common surface of every attester variant, plus the pieces variants
//! share: the collaborator bundle and the registry write that applies a
//! nullifier transition.

use std::sync::Arc;

use attest_core::{
    AttestError, Address, Attestation, AttestationExtraData, Clock, CollectionId, EventLog,
    Timestamp,
};
use attest_registry::{CommitmentMapperRegistry, RegistryWrite, RootsRegistry, SharedRegistry};
use attest_zkp::{ProofData, ProofVerifier};

use crate::config::{AttesterConfig, ConfigError};
use crate::error::AttesterError;
use crate::nullifier::TransitionPlan;
use crate::request::Request;
use crate::validation::{ClaimValidator, VerifiedClaim};

/// A proof-gated issuer of attestations.
pub trait Attester: Send + Sync {
    /// Identity the attester records under.
    fn address(&self) -> Address;

    /// First collection id of the attester's window.
    fn authorized_collection_id_first(&self) -> CollectionId;

    /// Last collection id of the attester's window (inclusive).
    fn authorized_collection_id_last(&self) -> CollectionId;

    /// Validate `request` against `proof` and return the attestations a
    /// [`generate_attestations`](Self::generate_attestations) call would
    /// record. Reads state only.
    fn build_attestations(
        &self,
        request: &Request,
        proof: &ProofData,
    ) -> Result<Vec<Attestation>, AttesterError>;

    /// Validate, apply the nullifier policy, and record the attestations.
    /// Either every effect lands or none does.
    fn generate_attestations(
        &self,
        request: &Request,
        proof: &ProofData,
    ) -> Result<Vec<Attestation>, AttesterError>;
}

/// External components an attester talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Registry the attester writes into.
    pub registry: SharedRegistry,
    /// Trusted registry roots.
    pub roots: Arc<dyn RootsRegistry>,
    /// Registered commitment-mapper key.
    pub commitment_mapper: Arc<dyn CommitmentMapperRegistry>,
    /// Proof verifier.
    pub verifier: Arc<dyn ProofVerifier>,
    /// Time source for cooldowns.
    pub clock: Arc<dyn Clock>,
    /// Journal for attester events.
    pub events: EventLog,
}

impl Collaborators {
    pub(crate) fn validator(&self, config: &AttesterConfig) -> Result<ClaimValidator, ConfigError> {
        config.validate()?;
        Ok(ClaimValidator::new(
            config.address,
            config.chain_id,
            config.window()?,
            self.roots.clone(),
            self.commitment_mapper.clone(),
            self.verifier.clone(),
        ))
    }
}

/// The attestation a verified claim produces.
pub(crate) fn attestation_for(issuer: Address, claim: &VerifiedClaim, burn_count: u16) -> Attestation {
    Attestation {
        collection_id: claim.collection_id,
        owner: claim.destination,
        issuer,
        value: claim.claimed_value,
        timestamp: Timestamp::from_secs(u64::from(claim.properties.generation_timestamp)),
        extra_data: AttestationExtraData {
            nullifier: claim.nullifier,
            burn_count,
        }
        .encode(),
    }
}

/// Delete the displaced destination's attestation (if any) and record the
/// new one in a single registry batch.
pub(crate) fn write_transition(
    registry: &SharedRegistry,
    issuer: &Address,
    plan: &TransitionPlan,
    attestation: &Attestation,
) -> Result<(), AttestError> {
    let mut writes = Vec::with_capacity(2);
    if let Some(previous) = plan.displaced_destination() {
        writes.push(RegistryWrite::Delete {
            collection_id: attestation.collection_id,
            owner: previous,
        });
    }
    writes.push(RegistryWrite::Record(attestation.clone()));
    registry.write().apply_writes(issuer, writes)
}
