//! # Attestation Records
//!
//! An [`Attestation`] is a claim `(collectionId, owner, issuer, value,
//! timestamp, extraData)`. The registry keys storage by
//! `(collectionId, owner)` and stores the remaining fields as
//! [`AttestationData`]. Recording again overwrites; there is exactly one
//! record per key.
//!
//! ## Presence
//!
//! An attestation is present iff its stored value is non-zero. Deleting
//! zeroes the value and clears issuer, timestamp and extra data.
//!
//! ## Extra Data Layout
//!
//! Proof-gated attesters store `{nullifier, burnCount}` in `extraData` as two
//! 32-byte big-endian words (`nullifier || burnCount`). Off-chain indexers
//! read this layout, so [`AttestationExtraData`] fixes it. A single-word
//! payload (nullifier only) decodes with a burn count of zero.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::collection::CollectionId;
use crate::error::ValidationError;
use crate::field::FieldElement;
use crate::time::Timestamp;

/// A full attestation, as issued by an attester and recorded by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attestation {
    /// Collection the attestation belongs to.
    pub collection_id: CollectionId,
    /// Destination account that holds the attestation.
    pub owner: Address,
    /// Issuer (attester) that recorded it.
    pub issuer: Address,
    /// Attested value. Zero means "no attestation".
    pub value: u128,
    /// Issuance timestamp (the group generation timestamp for proof-gated
    /// attesters).
    pub timestamp: Timestamp,
    /// Opaque issuer-specific payload.
    #[serde(with = "hex_bytes")]
    pub extra_data: Vec<u8>,
}

impl Attestation {
    /// The stored portion of this attestation.
    pub fn data(&self) -> AttestationData {
        AttestationData {
            issuer: self.issuer,
            value: self.value,
            timestamp: self.timestamp,
            extra_data: self.extra_data.clone(),
        }
    }

    /// Reassemble an attestation from its key and stored data.
    pub fn from_parts(collection_id: CollectionId, owner: Address, data: AttestationData) -> Self {
        Self {
            collection_id,
            owner,
            issuer: data.issuer,
            value: data.value,
            timestamp: data.timestamp,
            extra_data: data.extra_data,
        }
    }
}

/// The stored value of a `(collectionId, owner)` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AttestationData {
    /// Issuer that last wrote the record.
    pub issuer: Address,
    /// Attested value.
    pub value: u128,
    /// Issuance timestamp.
    pub timestamp: Timestamp,
    /// Issuer-specific payload.
    #[serde(with = "hex_bytes")]
    pub extra_data: Vec<u8>,
}

impl AttestationData {
    /// Whether this record counts as an attestation (`value != 0`).
    pub fn is_present(&self) -> bool {
        self.value != 0
    }
}

/// `{nullifier, burnCount}` payload of proof-gated attestations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttestationExtraData {
    /// Proof-derived pseudonymous identity token.
    pub nullifier: FieldElement,
    /// Number of times the nullifier has been rebound to a new destination.
    pub burn_count: u16,
}

impl AttestationExtraData {
    /// Size of the encoded payload in bytes.
    pub const ENCODED_LEN: usize = 64;

    /// Encode as `nullifier || burnCount`, two 32-byte big-endian words.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        out.extend_from_slice(self.nullifier.as_bytes());
        out.extend_from_slice(FieldElement::from_u64(u64::from(self.burn_count)).as_bytes());
        out
    }

    /// Decode a 64-byte `nullifier || burnCount` payload, or a 32-byte
    /// nullifier-only payload (burn count zero).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedExtraData`] for any other length
    /// or a burn-count word that does not fit in 16 bits.
    pub fn decode(bytes: &[u8]) -> Result<Self, ValidationError> {
        let word = |range: std::ops::Range<usize>| {
            let mut w = [0u8; 32];
            w.copy_from_slice(&bytes[range]);
            FieldElement::from_be_bytes(w)
        };
        match bytes.len() {
            32 => Ok(Self {
                nullifier: word(0..32),
                burn_count: 0,
            }),
            64 => {
                let burn_count = word(32..64)
                    .to_u64()
                    .and_then(|v| u16::try_from(v).ok())
                    .ok_or(ValidationError::MalformedExtraData { len: bytes.len() })?;
                Ok(Self {
                    nullifier: word(0..32),
                    burn_count,
                })
            }
            len => Err(ValidationError::MalformedExtraData { len }),
        }
    }
}

/// Serde helper for hex-encoding `Vec<u8>` fields as `0x`-prefixed strings.
///
/// Use with `#[serde(with = "attest_core::attestation::hex_bytes")]`.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as `0x`-prefixed lowercase hex.
    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    /// Deserialize hex text, with or without the `0x` prefix.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Attestation {
        Attestation {
            collection_id: CollectionId::new(10_000_005),
            owner: Address::repeat_byte(0xaa),
            issuer: Address::repeat_byte(0xbb),
            value: 7,
            timestamp: Timestamp::from_secs(1_700_000_000),
            extra_data: AttestationExtraData {
                nullifier: FieldElement::from_u64(99),
                burn_count: 2,
            }
            .encode(),
        }
    }

    #[test]
    fn extra_data_layout_is_two_words() {
        let encoded = AttestationExtraData {
            nullifier: FieldElement::from_u64(1),
            burn_count: 258,
        }
        .encode();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 1);
        assert_eq!(&encoded[62..], &[1, 2]);
    }

    #[test]
    fn extra_data_decodes_what_it_encodes() {
        let original = AttestationExtraData {
            nullifier: FieldElement::from_u128(u128::MAX),
            burn_count: u16::MAX,
        };
        assert_eq!(AttestationExtraData::decode(&original.encode()).unwrap(), original);
    }

    #[test]
    fn extra_data_nullifier_only_payload() {
        let decoded = AttestationExtraData::decode(FieldElement::from_u64(5).as_bytes()).unwrap();
        assert_eq!(decoded.nullifier, FieldElement::from_u64(5));
        assert_eq!(decoded.burn_count, 0);
    }

    #[test]
    fn extra_data_rejects_bad_length() {
        let err = AttestationExtraData::decode(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedExtraData { len: 10 }));
    }

    #[test]
    fn extra_data_rejects_oversized_burn_count() {
        let mut bytes = vec![0u8; 64];
        bytes[61] = 1; // 2^16
        assert!(AttestationExtraData::decode(&bytes).is_err());
    }

    #[test]
    fn data_and_from_parts_agree() {
        let a = sample();
        let rebuilt = Attestation::from_parts(a.collection_id, a.owner, a.data());
        assert_eq!(rebuilt, a);
    }

    #[test]
    fn presence_is_nonzero_value() {
        assert!(sample().data().is_present());
        assert!(!AttestationData::default().is_present());
    }

    #[test]
    fn serde_encodes_extra_data_as_hex() {
        let json = serde_json::to_value(sample()).unwrap();
        let extra = json["extra_data"].as_str().unwrap();
        assert!(extra.starts_with("0x"));
        assert_eq!(extra.len(), 2 + 128);
        let back: Attestation = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }
}
