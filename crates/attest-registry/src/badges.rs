//! # Badge Mirror
//!
//! A multi-token style view of attestation values: for every write the
//! registry reports the change in the owner's balance of the collection's
//! badge. Increases are reported as mints (`from = 0x0`), decreases as burns
//! (`to = 0x0`). Equal values produce no notification.
//!
//! The mirror is not authoritative. The registry logs a failed notification
//! and keeps the write.

use std::collections::HashMap;

use attest_core::{Address, CollectionId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single balance change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    /// The issuer whose write caused the change.
    pub operator: Address,
    /// Account debited, or zero for a mint.
    pub from: Address,
    /// Account credited, or zero for a burn.
    pub to: Address,
    /// Badge id (the collection id).
    pub collection_id: CollectionId,
    /// Magnitude of the change.
    pub amount: u128,
}

impl BalanceDelta {
    /// Delta for a record moving from `old` to `new`, or `None` if unchanged.
    pub fn between(
        operator: Address,
        owner: Address,
        collection_id: CollectionId,
        old: u128,
        new: u128,
    ) -> Option<Self> {
        use std::cmp::Ordering;
        let (from, to, amount) = match new.cmp(&old) {
            Ordering::Greater => (Address::ZERO, owner, new - old),
            Ordering::Less => (owner, Address::ZERO, old - new),
            Ordering::Equal => return None,
        };
        Some(Self {
            operator,
            from,
            to,
            collection_id,
            amount,
        })
    }
}

/// Error reported by a badge mirror.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BadgeError {
    /// A burn exceeded the account's balance.
    #[error("insufficient badge balance for {account} in {collection_id}: has {balance}, burning {amount}")]
    InsufficientBalance {
        /// Account being debited.
        account: Address,
        /// Badge id.
        collection_id: CollectionId,
        /// Current balance.
        balance: u128,
        /// Amount requested.
        amount: u128,
    },

    /// A mint would overflow the balance.
    #[error("badge balance overflow for {account} in {collection_id}")]
    Overflow {
        /// Account being credited.
        account: Address,
        /// Badge id.
        collection_id: CollectionId,
    },
}

/// Receiver of registry balance deltas.
pub trait BadgeMirror: Send + Sync {
    /// Apply one delta.
    fn on_balance_change(&self, delta: &BalanceDelta) -> Result<(), BadgeError>;
}

/// Balance table kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryBadges {
    state: Mutex<BadgeState>,
}

#[derive(Debug, Default)]
struct BadgeState {
    balances: HashMap<(CollectionId, Address), u128>,
    history: Vec<BalanceDelta>,
}

impl InMemoryBadges {
    /// Empty balances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account` for badge `collection_id`.
    pub fn balance_of(&self, account: &Address, collection_id: CollectionId) -> u128 {
        self.state
            .lock()
            .balances
            .get(&(collection_id, *account))
            .copied()
            .unwrap_or(0)
    }

    /// Every delta applied so far, oldest first.
    pub fn history(&self) -> Vec<BalanceDelta> {
        self.state.lock().history.clone()
    }
}

impl BadgeMirror for InMemoryBadges {
    fn on_balance_change(&self, delta: &BalanceDelta) -> Result<(), BadgeError> {
        let mut state = self.state.lock();
        let id = delta.collection_id;

        // Compute both sides before touching the table.
        let debit = if delta.from.is_zero() {
            None
        } else {
            let balance = state.balances.get(&(id, delta.from)).copied().unwrap_or(0);
            let remaining =
                balance
                    .checked_sub(delta.amount)
                    .ok_or(BadgeError::InsufficientBalance {
                        account: delta.from,
                        collection_id: id,
                        balance,
                        amount: delta.amount,
                    })?;
            Some(remaining)
        };
        let credit = if delta.to.is_zero() {
            None
        } else {
            let balance = state.balances.get(&(id, delta.to)).copied().unwrap_or(0);
            let total = balance
                .checked_add(delta.amount)
                .ok_or(BadgeError::Overflow {
                    account: delta.to,
                    collection_id: id,
                })?;
            Some(total)
        };

        if let Some(remaining) = debit {
            if remaining == 0 {
                state.balances.remove(&(id, delta.from));
            } else {
                state.balances.insert((id, delta.from), remaining);
            }
        }
        if let Some(total) = credit {
            state.balances.insert((id, delta.to), total);
        }
        state.history.push(delta.clone());
        Ok(())
    }
}
