//! # Nullifier State Machine
//!
//! Each nullifier is either unused or bound to exactly one destination:
//!
//! ```text
//!            first use                 different destination,
//!  absent ─────────────────▶ bound ───  cooldown elapsed  ───▶ bound
//!          start=0, burns=0    │         start=now, burns+1      (new dest)
//!                              │
//!                              ├── same destination ──▶ unchanged (renewal)
//!                              └── value 0 elsewhere ──▶ unchanged (revocation)
//! ```
//!
//! A nullifier is on cooldown while `cooldownStart + duration > now`.
//!
//! Transitions are planned against the current table without mutating it;
//! the attester commits the plan only after the registry write succeeds.

use std::collections::HashMap;

use attest_core::{Address, FieldElement, PolicyError, Timestamp};
use serde::{Deserialize, Serialize};

/// Stored state of a bound nullifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierRecord {
    /// Current destination.
    pub destination: Address,
    /// Start of the current cooldown window.
    pub cooldown_start: Timestamp,
    /// Number of destination changes so far.
    pub burn_count: u16,
}

impl NullifierRecord {
    /// Whether a rebind is blocked at `now` under `cooldown_duration`.
    pub fn is_on_cooldown(&self, cooldown_duration: u64, now: Timestamp) -> bool {
        self.cooldown_start.saturating_add(cooldown_duration) > now
    }
}

/// What a successful claim does to the nullifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First use: bind to the destination.
    Bind,
    /// Same destination again. Cooldown and burn count are untouched.
    Renew,
    /// Zero value for a different destination. The binding is kept; the
    /// previous destination's attestation is removed.
    Revoke {
        /// Destination the nullifier stays bound to.
        previous: Address,
    },
    /// Move to a new destination after the cooldown.
    Rebind {
        /// Destination being abandoned.
        previous: Address,
    },
}

/// A planned transition and the record it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    /// The nullifier.
    pub nullifier: FieldElement,
    /// Kind of change.
    pub transition: Transition,
    /// Record to store on commit.
    pub record: NullifierRecord,
}

impl TransitionPlan {
    /// Destination whose attestation must be deleted before recording.
    pub fn displaced_destination(&self) -> Option<Address> {
        match self.transition {
            Transition::Revoke { previous } | Transition::Rebind { previous } => Some(previous),
            Transition::Bind | Transition::Renew => None,
        }
    }
}

/// Table of bound nullifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NullifierTable {
    records: HashMap<FieldElement, NullifierRecord>,
}

impl NullifierTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record of `nullifier`, if bound.
    pub fn get(&self, nullifier: &FieldElement) -> Option<&NullifierRecord> {
        self.records.get(nullifier)
    }

    /// Current destination, or the zero address if unused.
    pub fn destination_of(&self, nullifier: &FieldElement) -> Address {
        self.get(nullifier).map_or(Address::ZERO, |r| r.destination)
    }

    /// Current cooldown start, zero if unused.
    pub fn cooldown_start(&self, nullifier: &FieldElement) -> Timestamp {
        self.get(nullifier).map_or(Timestamp::ZERO, |r| r.cooldown_start)
    }

    /// Current burn count, zero if unused.
    pub fn burn_count(&self, nullifier: &FieldElement) -> u16 {
        self.get(nullifier).map_or(0, |r| r.burn_count)
    }

    /// Number of bound nullifiers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no nullifier is bound.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Burn count an accountbound claim would carry, ignoring cooldown.
    /// Used for previews.
    pub fn next_burn_count(&self, nullifier: &FieldElement, destination: &Address, claimed_value: u128) -> u16 {
        match self.get(nullifier) {
            Some(r) if r.destination != *destination && claimed_value != 0 => {
                r.burn_count.saturating_add(1)
            }
            Some(r) => r.burn_count,
            None => 0,
        }
    }

    /// Plan the accountbound transition for a claim of `claimed_value` by
    /// `nullifier` for `destination` at `now`.
    ///
    /// `cooldown_duration` is only consulted for a rebind, so a missing
    /// duration never blocks first use, renewal or revocation.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::NullifierOnCooldown`] if a rebind comes too early.
    /// - [`PolicyError::BurnCountExhausted`] if the burn counter is full.
    /// - Whatever `cooldown_duration` returns.
    pub fn plan_accountbound<F>(
        &self,
        nullifier: FieldElement,
        destination: Address,
        claimed_value: u128,
        now: Timestamp,
        cooldown_duration: F,
    ) -> Result<TransitionPlan, PolicyError>
    where
        F: FnOnce() -> Result<u64, PolicyError>,
    {
        let Some(current) = self.get(&nullifier).copied() else {
            return Ok(TransitionPlan {
                nullifier,
                transition: Transition::Bind,
                record: NullifierRecord {
                    destination,
                    cooldown_start: Timestamp::ZERO,
                    burn_count: 0,
                },
            });
        };

        if current.destination == destination {
            return Ok(TransitionPlan {
                nullifier,
                transition: Transition::Renew,
                record: current,
            });
        }

        if claimed_value == 0 {
            return Ok(TransitionPlan {
                nullifier,
                transition: Transition::Revoke {
                    previous: current.destination,
                },
                record: current,
            });
        }

        let duration = cooldown_duration()?;
        if current.is_on_cooldown(duration, now) {
            return Err(PolicyError::NullifierOnCooldown {
                nullifier,
                destination: current.destination,
                cooldown_start: current.cooldown_start,
                burn_count: current.burn_count,
                cooldown_duration: duration,
            });
        }
        let burn_count = current
            .burn_count
            .checked_add(1)
            .ok_or(PolicyError::BurnCountExhausted { nullifier })?;
        Ok(TransitionPlan {
            nullifier,
            transition: Transition::Rebind {
                previous: current.destination,
            },
            record: NullifierRecord {
                destination,
                cooldown_start: now,
                burn_count,
            },
        })
    }

    /// Plan the single-use transition: a nullifier is bound once and may
    /// only be renewed for the same destination.
    ///
    /// # Errors
    ///
    /// [`PolicyError::NullifierUsed`] if the nullifier is bound elsewhere.
    pub fn plan_single_use(
        &self,
        nullifier: FieldElement,
        destination: Address,
    ) -> Result<TransitionPlan, PolicyError> {
        match self.get(&nullifier) {
            None => Ok(TransitionPlan {
                nullifier,
                transition: Transition::Bind,
                record: NullifierRecord {
                    destination,
                    cooldown_start: Timestamp::ZERO,
                    burn_count: 0,
                },
            }),
            Some(current) if current.destination == destination => Ok(TransitionPlan {
                nullifier,
                transition: Transition::Renew,
                record: *current,
            }),
            Some(current) => Err(PolicyError::NullifierUsed {
                nullifier,
                destination: current.destination,
            }),
        }
    }

    /// Store the record produced by `plan`.
    pub fn commit(&mut self, plan: &TransitionPlan) {
        self.records.insert(plan.nullifier, plan.record);
    }
}
