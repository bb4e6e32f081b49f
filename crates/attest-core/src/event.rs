//! # Event Journal
//!
//! Components emit [`Event`]s into a shared [`EventLog`] only after a call
//! has fully succeeded, so a failed call leaves no trace in the journal.
//! Each event is also mirrored to `tracing` at debug level for operators.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::attestation::Attestation;
use crate::collection::CollectionId;
use crate::field::FieldElement;

/// Everything the registry, the attesters and their collaborators announce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// An attestation was written (created or overwritten).
    AttestationRecorded(Attestation),
    /// An attestation was deleted. Carries the record as it was before.
    AttestationDeleted(Attestation),
    /// An issuer gained a collection range.
    IssuerAuthorized {
        /// The issuer.
        issuer: Address,
        /// Lower bound.
        min: CollectionId,
        /// Upper bound.
        max: CollectionId,
    },
    /// An issuer lost a collection range.
    IssuerUnauthorized {
        /// The issuer.
        issuer: Address,
        /// Lower bound.
        min: CollectionId,
        /// Upper bound.
        max: CollectionId,
    },
    /// Writes were paused.
    Paused {
        /// Who paused.
        by: Address,
    },
    /// Writes were resumed.
    Unpaused {
        /// Who unpaused.
        by: Address,
    },
    /// Ownership moved.
    OwnershipTransferred {
        /// Previous owner.
        previous_owner: Address,
        /// New owner.
        new_owner: Address,
    },
    /// An attester issued an attestation.
    AttestationGenerated(Attestation),
    /// A nullifier now points at a new destination.
    NullifierDestinationUpdated {
        /// The nullifier.
        nullifier: FieldElement,
        /// Its destination.
        new_destination: Address,
    },
    /// A nullifier was rebound; its cooldown restarted.
    NullifierSetOnCooldown {
        /// The nullifier.
        nullifier: FieldElement,
        /// Burn count after the rebind.
        burn_count: u16,
    },
    /// The cooldown for a group index changed.
    CooldownDurationSetForGroupIndex {
        /// The group index.
        group_index: u128,
        /// New duration in seconds.
        cooldown_duration: u64,
    },
    /// A merkle root became available. `attester == None` means for all.
    RootRegistered {
        /// Attester the root is scoped to, if any.
        attester: Option<Address>,
        /// The root.
        root: FieldElement,
    },
    /// A merkle root was withdrawn. `attester == None` means for all.
    RootUnregistered {
        /// Attester the root was scoped to, if any.
        attester: Option<Address>,
        /// The root.
        root: FieldElement,
    },
    /// The commitment-mapper public key changed.
    CommitmentMapperKeyUpdated {
        /// New x coordinate.
        x: FieldElement,
        /// New y coordinate.
        y: FieldElement,
    },
}

/// A cloneable handle to an append-only event journal.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    inner: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn emit(&self, event: Event) {
        tracing::debug!(?event, "event");
        self.inner.lock().push(event);
    }

    /// Append several events, preserving order.
    pub fn emit_all(&self, events: impl IntoIterator<Item = Event>) {
        let mut guard = self.inner.lock();
        for event in events {
            tracing::debug!(?event, "event");
            guard.push(event);
        }
    }

    /// Copy of every event so far.
    pub fn snapshot(&self) -> Vec<Event> {
        self.inner.lock().clone()
    }

    /// Take every event, leaving the journal empty.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.inner.lock())
    }

    /// Number of events in the journal.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
