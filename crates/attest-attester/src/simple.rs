//! # Simple Attester
//!
//! Single-use nullifiers: the first accepted claim binds a nullifier to its
//! destination for good. Later claims may renew that destination's
//! attestation; claims for any other destination fail with
//! [`PolicyError::NullifierUsed`](attest_core::PolicyError::NullifierUsed).
//! Attestations carry a burn count of zero.

use attest_core::{Address, Attestation, CollectionId, Event, EventLog, FieldElement};
use attest_registry::SharedRegistry;
use attest_zkp::ProofData;
use parking_lot::Mutex;

use crate::attester::{attestation_for, write_transition, Attester, Collaborators};
use crate::config::{AttesterConfig, ConfigError};
use crate::error::AttesterError;
use crate::nullifier::{NullifierTable, Transition};
use crate::request::Request;
use crate::validation::ClaimValidator;

/// Attester with single-use nullifiers.
pub struct SimpleAttester {
    validator: ClaimValidator,
    registry: SharedRegistry,
    events: EventLog,
    nullifiers: Mutex<NullifierTable>,
}

impl std::fmt::Debug for SimpleAttester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleAttester")
            .field("validator", &self.validator)
            .field("nullifiers", &self.nullifiers.lock().len())
            .finish_non_exhaustive()
    }
}

impl SimpleAttester {
    /// Build from configuration and collaborators.
    pub fn new(config: &AttesterConfig, collaborators: Collaborators) -> Result<Self, ConfigError> {
        Ok(Self {
            validator: collaborators.validator(config)?,
            registry: collaborators.registry,
            events: collaborators.events,
            nullifiers: Mutex::new(NullifierTable::new()),
        })
    }

    /// Destination `nullifier` is bound to, or the zero address.
    pub fn destination_of_nullifier(&self, nullifier: &FieldElement) -> Address {
        self.nullifiers.lock().destination_of(nullifier)
    }
}

impl Attester for SimpleAttester {
    fn address(&self) -> Address {
        self.validator.attester()
    }

    fn authorized_collection_id_first(&self) -> CollectionId {
        self.validator.window().min
    }

    fn authorized_collection_id_last(&self) -> CollectionId {
        self.validator.window().max
    }

    fn build_attestations(
        &self,
        request: &Request,
        proof: &ProofData,
    ) -> Result<Vec<Attestation>, AttesterError> {
        let verified = self.validator.validate(request, proof)?;
        Ok(vec![attestation_for(self.address(), &verified, 0)])
    }

    fn generate_attestations(
        &self,
        request: &Request,
        proof: &ProofData,
    ) -> Result<Vec<Attestation>, AttesterError> {
        let verified = self.validator.validate(request, proof)?;
        let issuer = self.address();

        let mut nullifiers = self.nullifiers.lock();
        let plan = nullifiers.plan_single_use(verified.nullifier, verified.destination)?;
        let attestation = attestation_for(issuer, &verified, 0);
        write_transition(&self.registry, &issuer, &plan, &attestation)?;
        nullifiers.commit(&plan);
        drop(nullifiers);

        tracing::info!(
            attester = %issuer,
            collection_id = %attestation.collection_id,
            destination = %attestation.owner,
            value = attestation.value,
            "attestation generated"
        );
        let mut events = vec![Event::AttestationGenerated(attestation.clone())];
        if plan.transition == Transition::Bind {
            events.push(Event::NullifierDestinationUpdated {
                nullifier: plan.nullifier,
                new_destination: verified.destination,
            });
        }
        self.events.emit_all(events);
        Ok(vec![attestation])
    }
}
