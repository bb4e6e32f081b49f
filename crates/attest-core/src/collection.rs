//! # Collection Identifiers and Ranges
//!
//! Attestations are grouped into collections. An issuer is authorized for
//! one or more inclusive `[min, max]` windows of collection ids; an attester
//! derives the collection id of a claim as `first + groupIndex` within its
//! own window.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier of an attestation collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CollectionId(u128);

impl CollectionId {
    /// Wrap a raw collection id.
    pub const fn new(id: u128) -> Self {
        Self(id)
    }

    /// The raw id.
    pub fn value(&self) -> u128 {
        self.0
    }

    /// `self + offset`, or `None` on overflow.
    pub fn checked_offset(&self, offset: u128) -> Option<Self> {
        self.0.checked_add(offset).map(Self)
    }
}

impl From<u128> for CollectionId {
    fn from(id: u128) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An inclusive window of collection ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionRange {
    /// Lowest collection id in the window.
    pub min: CollectionId,
    /// Highest collection id in the window.
    pub max: CollectionId,
}

impl CollectionRange {
    /// Build a range, rejecting `min > max`.
    pub fn new(min: impl Into<CollectionId>, max: impl Into<CollectionId>) -> Result<Self, ValidationError> {
        let (min, max) = (min.into(), max.into());
        if min > max {
            return Err(ValidationError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Whether `id` lies inside the window.
    pub fn contains(&self, id: CollectionId) -> bool {
        self.min <= id && id <= self.max
    }
}

impl std::fmt::Display for CollectionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
