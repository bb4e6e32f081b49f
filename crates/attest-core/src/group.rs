//! # Groups and Their Properties
//!
//! A group is a set of qualifying identities published as a merkle tree.
//! Its metadata (index, generation timestamp, score flag, and a cooldown
//! duration in the legacy layout) is encoded as a sequence of
//! 32-byte big-endian words. The group identifier is the Keccak-256 hash of
//! that encoding reduced into the BN254 scalar field:
//!
//! ```text
//! groupId = keccak256(encode(properties)) mod p
//! ```
//!
//! Because the id commits to the encoding, a claim cannot present altered
//! metadata without also presenting a different `groupId`, and the proof's
//! accounts-tree value pins the `groupId`.
//!
//! ## Encodings
//!
//! | Layout   | Words | Fields                                                      |
//! |----------|-------|-------------------------------------------------------------|
//! | standard | 3     | `groupIndex: u128, generationTimestamp: u32, isScore: bool` |
//! | legacy   | 4     | `groupIndex, generationTimestamp, cooldownDuration: u32, isScore` |
//!
//! The decoder selects the layout by length.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::error::ValidationError;
use crate::field::FieldElement;

const WORD: usize = 32;
const STANDARD_LEN: usize = 3 * WORD;
const LEGACY_LEN: usize = 4 * WORD;

/// Identifier of a group: a scalar-field hash of its encoded properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(FieldElement);

impl GroupId {
    /// Wrap a declared group id (for example, one supplied in a claim).
    pub const fn new(value: FieldElement) -> Self {
        Self(value)
    }

    /// The underlying field element.
    pub fn as_field(&self) -> &FieldElement {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata of a group, bound into its [`GroupId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupProperties {
    /// Index of the group. Offsets the attester's first collection id.
    pub group_index: u128,
    /// When the group snapshot was generated. Becomes the attestation
    /// timestamp.
    pub generation_timestamp: u32,
    /// Cooldown duration embedded in the legacy layout. `None` selects the
    /// standard three-word layout.
    pub cooldown_duration: Option<u32>,
    /// Whether the claimed value is a capped score (`true`) or a strict
    /// membership value (`false`).
    pub is_score: bool,
}

impl GroupProperties {
    /// Standard-layout properties.
    pub fn new(group_index: u128, generation_timestamp: u32, is_score: bool) -> Self {
        Self {
            group_index,
            generation_timestamp,
            cooldown_duration: None,
            is_score,
        }
    }

    /// Legacy-layout properties carrying an embedded cooldown duration.
    pub fn legacy(
        group_index: u128,
        generation_timestamp: u32,
        cooldown_duration: u32,
        is_score: bool,
    ) -> Self {
        Self {
            group_index,
            generation_timestamp,
            cooldown_duration: Some(cooldown_duration),
            is_score,
        }
    }

    /// Encode as 32-byte big-endian words.
    pub fn encode(&self) -> Vec<u8> {
        let mut words = vec![
            FieldElement::from_u128(self.group_index),
            FieldElement::from_u64(u64::from(self.generation_timestamp)),
        ];
        if let Some(cooldown) = self.cooldown_duration {
            words.push(FieldElement::from_u64(u64::from(cooldown)));
        }
        words.push(FieldElement::from(self.is_score));
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }

    /// Decode a standard (96-byte) or legacy (128-byte) encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedGroupProperties`] for any other
    /// length, a word that overflows its field type, or a flag word other
    /// than 0 or 1.
    pub fn decode(bytes: &[u8]) -> Result<Self, ValidationError> {
        let len = bytes.len();
        if len != STANDARD_LEN && len != LEGACY_LEN {
            return Err(ValidationError::MalformedGroupProperties {
                len,
                reason: "expected 3 or 4 words".to_string(),
            });
        }
        let words: Vec<FieldElement> = bytes
            .chunks_exact(WORD)
            .map(|chunk| {
                let mut w = [0u8; WORD];
                w.copy_from_slice(chunk);
                FieldElement::from_be_bytes(w)
            })
            .collect();
        let malformed = |reason: &str| ValidationError::MalformedGroupProperties {
            len,
            reason: reason.to_string(),
        };
        let as_u32 = |w: &FieldElement, what: &str| {
            w.to_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| malformed(&format!("{what} exceeds u32")))
        };

        let group_index = words[0]
            .to_u128()
            .ok_or_else(|| malformed("groupIndex exceeds u128"))?;
        let generation_timestamp = as_u32(&words[1], "generationTimestamp")?;
        let cooldown_duration = if len == LEGACY_LEN {
            Some(as_u32(&words[2], "cooldownDuration")?)
        } else {
            None
        };
        let flag = words[words.len() - 1];
        let is_score = if flag == FieldElement::ONE {
            true
        } else if flag.is_zero() {
            false
        } else {
            return Err(malformed("isScore is not a boolean"));
        };

        Ok(Self {
            group_index,
            generation_timestamp,
            cooldown_duration,
            is_score,
        })
    }

    /// The group id these properties commit to.
    pub fn group_id(&self) -> GroupId {
        group_id_from_encoded(&self.encode())
    }
}

/// `keccak256(encoded) mod p`.
pub fn group_id_from_encoded(encoded: &[u8]) -> GroupId {
    GroupId(FieldElement::reduce(&Keccak256::digest(encoded)))
}

/// The external nullifier an attester expects for a group index:
/// `keccak256(attester[20] || groupIndex[16, big-endian]) mod p`.
///
/// Binding the attester's own address means a proof produced for one
/// attester cannot be replayed against another.
pub fn external_nullifier(attester: &Address, group_index: u128) -> FieldElement {
    let mut hasher = Keccak256::new();
    hasher.update(attester.as_bytes());
    hasher.update(group_index.to_be_bytes());
    FieldElement::reduce(&hasher.finalize())
}
