//! # Accountbound Attester
//!
//! Binds each nullifier to one destination at a time. The binding can move
//! to another destination once the group's cooldown has elapsed since the
//! last move; each move deletes the old destination's attestation and
//! increments the burn count carried in the attestation's extra data.
//!
//! ## Cooldown Resolution
//!
//! For a claim on group index `g` the cooldown duration is, in order:
//!
//! 1. the duration embedded in legacy-layout group properties;
//! 2. the owner-set duration for `g`;
//! 3. the configured default.
//!
//! With none of these a rebind fails with
//! [`PolicyError::CooldownDurationNotSet`]. Changing a duration never
//! rewrites stored cooldown starts or burn counts.
//!
//! ## Atomicity
//!
//! `generate_attestations` holds the attester state lock across planning,
//! the registry batch and the commit. The nullifier table changes only
//! after the registry accepts the batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use attest_core::{
    AttestError, Address, Attestation, Clock, CollectionId, Event, EventLog, FieldElement,
    GroupProperties, Ownable, PolicyError,
};
use attest_registry::SharedRegistry;
use attest_zkp::ProofData;
use parking_lot::Mutex;

use crate::attester::{attestation_for, write_transition, Attester, Collaborators};
use crate::config::{AttesterConfig, ConfigError};
use crate::error::AttesterError;
use crate::nullifier::{NullifierRecord, NullifierTable, Transition};
use crate::request::Request;
use crate::validation::ClaimValidator;

#[derive(Debug)]
struct AccountboundState {
    ownable: Ownable,
    nullifiers: NullifierTable,
    cooldowns: BTreeMap<u128, u64>,
}

/// Attester whose nullifiers are rebindable after a cooldown.
pub struct AccountboundAttester {
    validator: ClaimValidator,
    registry: SharedRegistry,
    clock: Arc<dyn Clock>,
    events: EventLog,
    default_cooldown: Option<u64>,
    state: Mutex<AccountboundState>,
}

impl std::fmt::Debug for AccountboundAttester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountboundAttester")
            .field("validator", &self.validator)
            .field("default_cooldown", &self.default_cooldown)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

fn resolve_cooldown(
    properties: &GroupProperties,
    table: &BTreeMap<u128, u64>,
    default: Option<u64>,
) -> Result<u64, PolicyError> {
    properties
        .cooldown_duration
        .map(u64::from)
        .or_else(|| table.get(&properties.group_index).copied())
        .or(default)
        .ok_or(PolicyError::CooldownDurationNotSet {
            group_index: properties.group_index,
        })
}

impl AccountboundAttester {
    /// Build from configuration and collaborators. `owner` administers
    /// cooldown durations.
    pub fn new(
        config: &AttesterConfig,
        owner: Address,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            validator: collaborators.validator(config)?,
            registry: collaborators.registry,
            clock: collaborators.clock,
            events: collaborators.events,
            default_cooldown: config.default_cooldown_secs,
            state: Mutex::new(AccountboundState {
                ownable: Ownable::new(owner),
                nullifiers: NullifierTable::new(),
                cooldowns: config.cooldown_durations.clone(),
            }),
        })
    }

    // ── Administration ──────────────────────────────────────────────

    /// The current owner.
    pub fn owner(&self) -> Address {
        self.state.lock().ownable.owner()
    }

    /// Hand ownership to `new_owner`.
    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<(), AttestError> {
        let previous = self
            .state
            .lock()
            .ownable
            .transfer_ownership(caller, new_owner)?;
        tracing::info!(attester = %self.address(), previous = %previous, new_owner = %new_owner, "attester ownership transferred");
        self.events.emit(Event::OwnershipTransferred {
            previous_owner: previous,
            new_owner,
        });
        Ok(())
    }

    /// Set the cooldown for `group_index`. Owner only.
    pub fn set_cooldown_duration_for_group_index(
        &self,
        caller: &Address,
        group_index: u128,
        cooldown_duration: u64,
    ) -> Result<(), AttestError> {
        let mut state = self.state.lock();
        state.ownable.ensure_owner(caller)?;
        state.cooldowns.insert(group_index, cooldown_duration);
        drop(state);
        tracing::info!(group_index, cooldown_duration, "cooldown duration set");
        self.events.emit(Event::CooldownDurationSetForGroupIndex {
            group_index,
            cooldown_duration,
        });
        Ok(())
    }

    // ── Nullifier queries ───────────────────────────────────────────

    /// Destination `nullifier` is bound to, or the zero address.
    pub fn destination_of_nullifier(&self, nullifier: &FieldElement) -> Address {
        self.state.lock().nullifiers.destination_of(nullifier)
    }

    /// Start of `nullifier`'s current cooldown window.
    pub fn nullifier_cooldown_start(&self, nullifier: &FieldElement) -> attest_core::Timestamp {
        self.state.lock().nullifiers.cooldown_start(nullifier)
    }

    /// Number of times `nullifier` has changed destination.
    pub fn nullifier_burn_count(&self, nullifier: &FieldElement) -> u16 {
        self.state.lock().nullifiers.burn_count(nullifier)
    }

    /// Full record of `nullifier`, if bound.
    pub fn nullifier_record(&self, nullifier: &FieldElement) -> Option<NullifierRecord> {
        self.state.lock().nullifiers.get(nullifier).copied()
    }

    /// Owner-set cooldown for `group_index`, if any.
    pub fn cooldown_duration_for_group_index(&self, group_index: u128) -> Option<u64> {
        self.state.lock().cooldowns.get(&group_index).copied()
    }

    /// Whether a rebind of `nullifier` under `properties` would be refused
    /// right now. The duration is resolved the same way a rebind resolves
    /// it. Unbound nullifiers are never on cooldown.
    ///
    /// # Errors
    ///
    /// [`PolicyError::CooldownDurationNotSet`] if the nullifier is bound and
    /// no embedded, per-group or default duration applies.
    pub fn is_nullifier_on_cooldown(
        &self,
        nullifier: &FieldElement,
        properties: &GroupProperties,
    ) -> Result<bool, PolicyError> {
        let state = self.state.lock();
        let Some(record) = state.nullifiers.get(nullifier) else {
            return Ok(false);
        };
        let duration = resolve_cooldown(properties, &state.cooldowns, self.default_cooldown)?;
        Ok(record.is_on_cooldown(duration, self.clock.now()))
    }
}

impl Attester for AccountboundAttester {
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
        let burn_count = self.state.lock().nullifiers.next_burn_count(
            &verified.nullifier,
            &verified.destination,
            verified.claimed_value,
        );
        Ok(vec![attestation_for(self.address(), &verified, burn_count)])
    }

    fn generate_attestations(
        &self,
        request: &Request,
        proof: &ProofData,
    ) -> Result<Vec<Attestation>, AttesterError> {
        let verified = self.validator.validate(request, proof)?;
        let issuer = self.address();

        let mut guard = self.state.lock();
        let now = self.clock.now();
        let state = &mut *guard;
        let cooldowns = &state.cooldowns;
        let default_cooldown = self.default_cooldown;
        let planned = state.nullifiers.plan_accountbound(
            verified.nullifier,
            verified.destination,
            verified.claimed_value,
            now,
            || resolve_cooldown(&verified.properties, cooldowns, default_cooldown),
        );
        let plan = match planned {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(
                    attester = %issuer,
                    nullifier = %verified.nullifier,
                    destination = %verified.destination,
                    error = %e,
                    "claim refused by nullifier policy"
                );
                return Err(e.into());
            }
        };
        let attestation = attestation_for(issuer, &verified, plan.record.burn_count);
        write_transition(&self.registry, &issuer, &plan, &attestation)?;
        state.nullifiers.commit(&plan);
        drop(guard);

        let mut events = vec![Event::AttestationGenerated(attestation.clone())];
        match plan.transition {
            Transition::Bind => {
                tracing::info!(
                    attester = %issuer,
                    collection_id = %attestation.collection_id,
                    destination = %verified.destination,
                    value = attestation.value,
                    "attestation generated for new nullifier"
                );
                events.push(Event::NullifierDestinationUpdated {
                    nullifier: plan.nullifier,
                    new_destination: verified.destination,
                });
            }
            Transition::Rebind { previous } => {
                tracing::info!(
                    attester = %issuer,
                    collection_id = %attestation.collection_id,
                    previous = %previous,
                    destination = %verified.destination,
                    burn_count = plan.record.burn_count,
                    "nullifier rebound"
                );
                events.push(Event::NullifierDestinationUpdated {
                    nullifier: plan.nullifier,
                    new_destination: verified.destination,
                });
                events.push(Event::NullifierSetOnCooldown {
                    nullifier: plan.nullifier,
                    burn_count: plan.record.burn_count,
                });
            }
            Transition::Revoke { previous } => {
                tracing::info!(
                    attester = %issuer,
                    collection_id = %attestation.collection_id,
                    previous = %previous,
                    "attestation revoked to zero"
                );
            }
            Transition::Renew => {
                tracing::info!(
                    attester = %issuer,
                    collection_id = %attestation.collection_id,
                    destination = %verified.destination,
                    value = attestation.value,
                    "attestation renewed"
                );
            }
        }
        self.events.emit_all(events);
        Ok(vec![attestation])
    }
}
