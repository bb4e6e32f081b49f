//! # Attestations Registry
//!
//! Storage of attestations keyed by `(collectionId, owner)`, the per-issuer
//! authorization table, and the pause switch.
//!
//! ## Write Path
//!
//! [`AttestationsRegistry::apply_writes`] is the only mutation path for
//! attestations. `record_attestations` and `delete_attestations` build a
//! batch and delegate to it. A batch is checked in full (pause switch,
//! issuer identity, authorization for every collection id) before any
//! record changes, so a delete-then-record issued by an attester lands
//! together or not at all. Events are emitted after the batch commits.
//!
//! ## Badge Mirror
//!
//! After a batch commits, each record whose value changed is reported to the
//! badge mirror as a mint or a burn. A failing mirror is logged and ignored.
//!
//! ## Concurrency
//!
//! The registry is a plain `&mut self` state machine. Attesters share it
//! through [`SharedRegistry`] (`Arc<RwLock<_>>`); the write lock serializes
//! batches, which gives per-call atomicity.

use std::collections::HashMap;
use std::sync::Arc;

use attest_core::{
    AttestError, Address, Attestation, AttestationData, AuthorizationError, CollectionId,
    CollectionRange, Event, EventLog, LifecycleError, Ownable, Timestamp, ValidationError,
};
use parking_lot::RwLock;

use crate::badges::{BadgeMirror, BalanceDelta};
use crate::ranges::AuthorizedRanges;

/// Registry handle shared between attesters and admin callers.
pub type SharedRegistry = Arc<RwLock<AttestationsRegistry>>;

/// One entry of an atomic write batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryWrite {
    /// Upsert an attestation. Its issuer must be the caller.
    Record(Attestation),
    /// Zero the record at `(collection_id, owner)`.
    Delete {
        /// Collection of the record.
        collection_id: CollectionId,
        /// Owner of the record.
        owner: Address,
    },
}

impl RegistryWrite {
    /// Collection id the write touches.
    pub fn collection_id(&self) -> CollectionId {
        match self {
            Self::Record(attestation) => attestation.collection_id,
            Self::Delete { collection_id, .. } => *collection_id,
        }
    }
}

/// The attestation registry.
pub struct AttestationsRegistry {
    ownable: Ownable,
    paused: bool,
    ranges: AuthorizedRanges,
    records: HashMap<(CollectionId, Address), AttestationData>,
    badges: Option<Arc<dyn BadgeMirror>>,
    events: EventLog,
}

impl std::fmt::Debug for AttestationsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationsRegistry")
            .field("owner", &self.ownable.owner())
            .field("paused", &self.paused)
            .field("records", &self.records.len())
            .field("badges", &self.badges.is_some())
            .finish_non_exhaustive()
    }
}

impl AttestationsRegistry {
    /// Create an empty, unpaused registry owned by `owner`.
    pub fn new(owner: Address, events: EventLog) -> Self {
        Self {
            ownable: Ownable::new(owner),
            paused: false,
            ranges: AuthorizedRanges::new(),
            records: HashMap::new(),
            badges: None,
            events,
        }
    }

    /// Attach a badge mirror that receives balance deltas.
    pub fn with_badge_mirror(mut self, badges: Arc<dyn BadgeMirror>) -> Self {
        self.badges = Some(badges);
        self
    }

    /// Wrap into a shareable handle.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    // ── Ownership and pause ─────────────────────────────────────────

    /// The current owner.
    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    /// Hand ownership to `new_owner`.
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), AttestError> {
        let previous = self.ownable.transfer_ownership(caller, new_owner)?;
        tracing::info!(previous = %previous, new_owner = %new_owner, "registry ownership transferred");
        self.events.emit(Event::OwnershipTransferred {
            previous_owner: previous,
            new_owner,
        });
        Ok(())
    }

    /// Whether writes are currently rejected.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reject all writes until [`unpause`](Self::unpause).
    pub fn pause(&mut self, caller: &Address) -> Result<(), AttestError> {
        self.ownable.ensure_owner(caller)?;
        if self.paused {
            return Err(LifecycleError::AlreadyInState("paused").into());
        }
        self.paused = true;
        tracing::info!(by = %caller, "registry paused");
        self.events.emit(Event::Paused { by: *caller });
        Ok(())
    }

    /// Accept writes again.
    pub fn unpause(&mut self, caller: &Address) -> Result<(), AttestError> {
        self.ownable.ensure_owner(caller)?;
        if !self.paused {
            return Err(LifecycleError::AlreadyInState("unpaused").into());
        }
        self.paused = false;
        tracing::info!(by = %caller, "registry unpaused");
        self.events.emit(Event::Unpaused { by: *caller });
        Ok(())
    }

    // ── Authorization ranges ────────────────────────────────────────

    /// Authorize `issuer` for `[min, max]`.
    pub fn authorize_range(
        &mut self,
        caller: &Address,
        issuer: Address,
        min: CollectionId,
        max: CollectionId,
    ) -> Result<(), AttestError> {
        self.ownable.ensure_owner(caller)?;
        let range = CollectionRange::new(min, max)?;
        self.authorize_ranges(caller, issuer, &[range])
    }

    /// Authorize `issuer` for every window in `ranges`.
    pub fn authorize_ranges(
        &mut self,
        caller: &Address,
        issuer: Address,
        ranges: &[CollectionRange],
    ) -> Result<(), AttestError> {
        self.ownable.ensure_owner(caller)?;
        if issuer.is_zero() {
            return Err(ValidationError::ZeroAddress("issuer").into());
        }
        if let Some(bad) = ranges.iter().find(|r| r.min > r.max) {
            return Err(ValidationError::InvertedRange {
                min: bad.min,
                max: bad.max,
            }
            .into());
        }
        self.ranges.push(issuer, ranges);
        for range in ranges {
            tracing::info!(issuer = %issuer, range = %range, "issuer authorized");
        }
        self.events.emit_all(ranges.iter().map(|r| Event::IssuerAuthorized {
            issuer,
            min: r.min,
            max: r.max,
        }));
        Ok(())
    }

    /// Remove `issuer`'s window at `index`, which must equal `[min, max]`.
    /// The supplied bounds are only compared against the stored window, so
    /// inverted bounds surface as an index or mismatch error.
    pub fn unauthorize_range(
        &mut self,
        caller: &Address,
        issuer: Address,
        index: usize,
        min: CollectionId,
        max: CollectionId,
    ) -> Result<(), AttestError> {
        self.unauthorize_ranges(caller, issuer, &[index], &[CollectionRange { min, max }])
    }

    /// Remove several windows at once. Indexes refer to the list as it is
    /// before the call; any bad pair fails the whole call.
    pub fn unauthorize_ranges(
        &mut self,
        caller: &Address,
        issuer: Address,
        indexes: &[usize],
        ranges: &[CollectionRange],
    ) -> Result<(), AttestError> {
        self.ownable.ensure_owner(caller)?;
        let descending = self.ranges.validate_removal(&issuer, indexes, ranges)?;
        self.ranges.remove_validated(&issuer, &descending);
        for range in ranges {
            tracing::info!(issuer = %issuer, range = %range, "issuer unauthorized");
        }
        self.events.emit_all(ranges.iter().map(|r| Event::IssuerUnauthorized {
            issuer,
            min: r.min,
            max: r.max,
        }));
        Ok(())
    }

    /// Whether `issuer` may write `collection_id`.
    pub fn is_authorized(&self, issuer: &Address, collection_id: CollectionId) -> bool {
        self.ranges.is_authorized(issuer, collection_id)
    }

    /// `issuer`'s windows in storage order.
    pub fn authorized_ranges(&self, issuer: &Address) -> &[CollectionRange] {
        self.ranges.ranges_of(issuer)
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Upsert every attestation in `attestations`.
    pub fn record_attestations(
        &mut self,
        caller: &Address,
        attestations: &[Attestation],
    ) -> Result<(), AttestError> {
        let writes: Vec<RegistryWrite> = attestations
            .iter()
            .cloned()
            .map(RegistryWrite::Record)
            .collect();
        self.apply_writes(caller, writes)
    }

    /// Zero the records at `(collection_ids[i], owners[i])`.
    pub fn delete_attestations(
        &mut self,
        caller: &Address,
        owners: &[Address],
        collection_ids: &[CollectionId],
    ) -> Result<(), AttestError> {
        if owners.len() != collection_ids.len() {
            return Err(ValidationError::LengthMismatch {
                what: "owners and collection ids",
                left: owners.len(),
                right: collection_ids.len(),
            }
            .into());
        }
        let writes: Vec<RegistryWrite> = owners
            .iter()
            .zip(collection_ids)
            .map(|(&owner, &collection_id)| RegistryWrite::Delete {
                collection_id,
                owner,
            })
            .collect();
        self.apply_writes(caller, writes)
    }

    /// Apply a write batch atomically.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Paused`] while paused.
    /// - [`AuthorizationError::IssuerMismatch`] if a recorded attestation
    ///   names an issuer other than `caller`.
    /// - [`AuthorizationError::IssuerNotAuthorized`] if `caller` has no
    ///   window covering a written collection id.
    ///
    /// On error nothing is written and no event is emitted.
    pub fn apply_writes(&mut self, caller: &Address, writes: Vec<RegistryWrite>) -> Result<(), AttestError> {
        if self.paused {
            return Err(LifecycleError::Paused.into());
        }
        for write in &writes {
            if let RegistryWrite::Record(attestation) = write {
                if attestation.issuer != *caller {
                    return Err(AuthorizationError::IssuerMismatch {
                        caller: *caller,
                        issuer: attestation.issuer,
                    }
                    .into());
                }
            }
            let collection_id = write.collection_id();
            if !self.ranges.is_authorized(caller, collection_id) {
                return Err(AuthorizationError::IssuerNotAuthorized {
                    issuer: *caller,
                    collection_id,
                }
                .into());
            }
        }

        let mut events = Vec::with_capacity(writes.len());
        let mut deltas = Vec::new();
        for write in writes {
            match write {
                RegistryWrite::Record(attestation) => {
                    let key = (attestation.collection_id, attestation.owner);
                    let previous = self
                        .records
                        .insert(key, attestation.data())
                        .map_or(0, |d| d.value);
                    tracing::debug!(
                        collection_id = %attestation.collection_id,
                        owner = %attestation.owner,
                        value = attestation.value,
                        previous,
                        "attestation recorded"
                    );
                    deltas.extend(BalanceDelta::between(
                        *caller,
                        attestation.owner,
                        attestation.collection_id,
                        previous,
                        attestation.value,
                    ));
                    events.push(Event::AttestationRecorded(attestation));
                }
                RegistryWrite::Delete {
                    collection_id,
                    owner,
                } => {
                    let previous = self
                        .records
                        .remove(&(collection_id, owner))
                        .unwrap_or_default();
                    tracing::debug!(
                        collection_id = %collection_id,
                        owner = %owner,
                        previous = previous.value,
                        "attestation deleted"
                    );
                    deltas.extend(BalanceDelta::between(
                        *caller,
                        owner,
                        collection_id,
                        previous.value,
                        0,
                    ));
                    events.push(Event::AttestationDeleted(Attestation::from_parts(
                        collection_id,
                        owner,
                        previous,
                    )));
                }
            }
        }

        self.events.emit_all(events);
        self.notify_badges(&deltas);
        Ok(())
    }

    fn notify_badges(&self, deltas: &[BalanceDelta]) {
        let Some(badges) = &self.badges else {
            return;
        };
        for delta in deltas {
            if let Err(e) = badges.on_balance_change(delta) {
                tracing::warn!(
                    collection_id = %delta.collection_id,
                    from = %delta.from,
                    to = %delta.to,
                    amount = delta.amount,
                    error = %e,
                    "badge mirror rejected balance change"
                );
            }
        }
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Stored data at `(collection_id, owner)`; all-zero if absent.
    pub fn attestation_data(&self, collection_id: CollectionId, owner: &Address) -> AttestationData {
        self.records
            .get(&(collection_id, *owner))
            .cloned()
            .unwrap_or_default()
    }

    /// The full attestation, if one is present (non-zero value).
    pub fn attestation(&self, collection_id: CollectionId, owner: &Address) -> Option<Attestation> {
        self.records
            .get(&(collection_id, *owner))
            .filter(|d| d.is_present())
            .map(|d| Attestation::from_parts(collection_id, *owner, d.clone()))
    }

    /// Stored value; zero if absent.
    pub fn attestation_value(&self, collection_id: CollectionId, owner: &Address) -> u128 {
        self.records
            .get(&(collection_id, *owner))
            .map_or(0, |d| d.value)
    }

    /// Issuer of the stored record; zero address if absent.
    pub fn attestation_issuer(&self, collection_id: CollectionId, owner: &Address) -> Address {
        self.records
            .get(&(collection_id, *owner))
            .map_or(Address::ZERO, |d| d.issuer)
    }

    /// Timestamp of the stored record; zero if absent.
    pub fn attestation_timestamp(&self, collection_id: CollectionId, owner: &Address) -> Timestamp {
        self.records
            .get(&(collection_id, *owner))
            .map_or(Timestamp::ZERO, |d| d.timestamp)
    }

    /// Extra data of the stored record; empty if absent.
    pub fn attestation_extra_data(&self, collection_id: CollectionId, owner: &Address) -> Vec<u8> {
        self.records
            .get(&(collection_id, *owner))
            .map(|d| d.extra_data.clone())
            .unwrap_or_default()
    }

    /// `(issuer, value, timestamp, extra_data)` of the stored record.
    pub fn attestation_data_tuple(
        &self,
        collection_id: CollectionId,
        owner: &Address,
    ) -> (Address, u128, Timestamp, Vec<u8>) {
        let d = self.attestation_data(collection_id, owner);
        (d.issuer, d.value, d.timestamp, d.extra_data)
    }

    /// Whether a non-zero value is stored at `(collection_id, owner)`.
    pub fn has_attestation(&self, collection_id: CollectionId, owner: &Address) -> bool {
        self.attestation_value(collection_id, owner) != 0
    }

    /// [`attestation_data`](Self::attestation_data) for parallel lists.
    pub fn attestation_data_batch(
        &self,
        collection_ids: &[CollectionId],
        owners: &[Address],
    ) -> Result<Vec<AttestationData>, ValidationError> {
        ensure_same_length(collection_ids, owners)?;
        Ok(collection_ids
            .iter()
            .zip(owners)
            .map(|(&id, owner)| self.attestation_data(id, owner))
            .collect())
    }

    /// [`attestation_value`](Self::attestation_value) for parallel lists.
    pub fn attestation_value_batch(
        &self,
        collection_ids: &[CollectionId],
        owners: &[Address],
    ) -> Result<Vec<u128>, ValidationError> {
        ensure_same_length(collection_ids, owners)?;
        Ok(collection_ids
            .iter()
            .zip(owners)
            .map(|(&id, owner)| self.attestation_value(id, owner))
            .collect())
    }

    /// Number of stored records, present or zero-valued.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn ensure_same_length(collection_ids: &[CollectionId], owners: &[Address]) -> Result<(), ValidationError> {
    if collection_ids.len() != owners.len() {
        return Err(ValidationError::LengthMismatch {
            what: "collection ids and owners",
            left: collection_ids.len(),
            right: owners.len(),
        });
    }
    Ok(())
}
