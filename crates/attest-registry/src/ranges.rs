//! # Issuer Authorization Ranges
//!
//! Each issuer holds an ordered list of inclusive collection windows. An
//! issuer may write collection `c` iff some window contains `c`.
//!
//! ## Removal Protocol
//!
//! Removal addresses a window by its index and must restate the stored
//! bounds exactly; a stale or mistaken index is rejected rather than
//! silently removing the wrong window. Plural removal validates every
//! `(index, bounds)` pair against the list as it stood before the call,
//! then removes in descending index order so the pairs stay meaningful.
//! Removal preserves the order of the surviving windows.

use std::collections::{BTreeSet, HashMap};

use attest_core::{Address, CollectionId, CollectionRange, ValidationError};

/// Per-issuer authorized collection windows.
#[derive(Debug, Clone, Default)]
pub struct AuthorizedRanges {
    ranges: HashMap<Address, Vec<CollectionRange>>,
}

impl AuthorizedRanges {
    /// Empty table: nobody is authorized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append windows to `issuer`'s list.
    pub fn push(&mut self, issuer: Address, ranges: &[CollectionRange]) {
        self.ranges.entry(issuer).or_default().extend_from_slice(ranges);
    }

    /// Check a batch of removals against the current list without mutating.
    ///
    /// Returns the distinct indexes in descending order, ready for
    /// [`remove_validated`](Self::remove_validated).
    pub fn validate_removal(
        &self,
        issuer: &Address,
        indexes: &[usize],
        ranges: &[CollectionRange],
    ) -> Result<Vec<usize>, ValidationError> {
        if indexes.len() != ranges.len() {
            return Err(ValidationError::LengthMismatch {
                what: "range indexes and ranges",
                left: indexes.len(),
                right: ranges.len(),
            });
        }
        let stored = self.ranges_of(issuer);
        let mut distinct = BTreeSet::new();
        for (&index, supplied) in indexes.iter().zip(ranges) {
            let current = stored
                .get(index)
                .ok_or(ValidationError::RangeIndexOutOfBounds {
                    issuer: *issuer,
                    length: stored.len(),
                    index,
                })?;
            if current != supplied {
                return Err(ValidationError::RangeMismatch {
                    issuer: *issuer,
                    index,
                    expected_min: current.min,
                    expected_max: current.max,
                    min: supplied.min,
                    max: supplied.max,
                });
            }
            if !distinct.insert(index) {
                return Err(ValidationError::DuplicateRangeIndex {
                    issuer: *issuer,
                    index,
                });
            }
        }
        Ok(distinct.into_iter().rev().collect())
    }

    /// Remove windows at indexes returned by
    /// [`validate_removal`](Self::validate_removal).
    pub fn remove_validated(&mut self, issuer: &Address, descending: &[usize]) {
        let Some(list) = self.ranges.get_mut(issuer) else {
            return;
        };
        for &index in descending {
            if index < list.len() {
                list.remove(index);
            }
        }
        if list.is_empty() {
            self.ranges.remove(issuer);
        }
    }

    /// Whether `issuer` may write `collection_id`.
    pub fn is_authorized(&self, issuer: &Address, collection_id: CollectionId) -> bool {
        self.ranges_of(issuer)
            .iter()
            .any(|r| r.contains(collection_id))
    }

    /// `issuer`'s windows in insertion order.
    pub fn ranges_of(&self, issuer: &Address) -> &[CollectionRange] {
        self.ranges.get(issuer).map(Vec::as_slice).unwrap_or(&[])
    }
}
