//! # Scalar-Field Elements
//!
//! Proof public inputs, group identifiers, nullifiers and merkle roots are
//! all 256-bit words interpreted in the BN254 scalar field. [`FieldElement`]
//! stores the raw big-endian word so that out-of-range values can still be
//! represented and rejected by the verifier with a precise reason, rather
//! than being silently reduced on the way in.
//!
//! Reduction (`hash mod p`) is explicit: [`FieldElement::reduce`] is the
//! only constructor that maps arbitrary bytes into the field.
//!
//! ## Security Invariant
//!
//! A value produced by [`FieldElement::reduce`] always satisfies
//! [`FieldElement::is_in_scalar_field`]. Values constructed from raw words
//! may not, and every consumer that requires a canonical field element must
//! check.

use ark_bn254::Fr;
use ark_ff::{BigInt, BigInteger, PrimeField};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::ValidationError;

/// A 256-bit big-endian word interpreted in the BN254 scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldElement([u8; 32]);

impl FieldElement {
    /// The zero word.
    pub const ZERO: FieldElement = FieldElement([0u8; 32]);

    /// The word `1`.
    pub const ONE: FieldElement = FieldElement([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 1,
    ]);

    /// Wrap a raw big-endian word. The result may lie outside the field.
    pub const fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw big-endian word.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Borrow the raw big-endian word.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Left-pad a `u64`.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Left-pad a `u128`.
    pub fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Left-pad an address (20 bytes into the low end of the word).
    pub fn from_address(address: &Address) -> Self {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(address.as_bytes());
        Self(bytes)
    }

    /// The word as a `u64`, or `None` if any high byte is set.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[24..]);
        Some(u64::from_be_bytes(low))
    }

    /// The word as a `u128`, or `None` if any high byte is set.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[..16].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        Some(u128::from_be_bytes(low))
    }

    /// The word as an address, or `None` if it does not fit in 160 bits.
    pub fn to_address(&self) -> Option<Address> {
        if self.0[..12].iter().any(|b| *b != 0) {
            return None;
        }
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&self.0[12..]);
        Some(Address::new(raw))
    }

    /// Whether the word is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Interpret arbitrary big-endian bytes as an integer and reduce it
    /// modulo the BN254 scalar field order.
    pub fn reduce(bytes: &[u8]) -> Self {
        Self::from_fr(Fr::from_be_bytes_mod_order(bytes))
    }

    /// Whether the word is strictly less than the scalar field modulus.
    pub fn is_in_scalar_field(&self) -> bool {
        self.to_bigint() < Fr::MODULUS
    }

    /// The scalar field modulus itself (which is *not* a field element).
    pub fn scalar_field_modulus() -> Self {
        Self::from_bigint(Fr::MODULUS)
    }

    /// Lowercase hex with `0x` prefix, always 64 digits.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    fn from_fr(value: Fr) -> Self {
        Self::from_bigint(value.into_bigint())
    }

    fn from_bigint(value: BigInt<4>) -> Self {
        let raw = value.to_bytes_be();
        let mut bytes = [0u8; 32];
        bytes[32 - raw.len()..].copy_from_slice(&raw);
        Self(bytes)
    }

    fn to_bigint(&self) -> BigInt<4> {
        // Limbs are little-endian u64 words.
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let start = 32 - (i + 1) * 8;
            let mut word = [0u8; 8];
            word.copy_from_slice(&self.0[start..start + 8]);
            *limb = u64::from_be_bytes(word);
        }
        BigInt::new(limbs)
    }
}

impl From<bool> for FieldElement {
    fn from(flag: bool) -> Self {
        if flag {
            Self::ONE
        } else {
            Self::ZERO
        }
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u128> for FieldElement {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<&Address> for FieldElement {
    fn from(address: &Address) -> Self {
        Self::from_address(address)
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for FieldElement {
    type Err = ValidationError;

    /// Parse up to 64 hex digits (optional `0x`), left-padding short input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > 64 {
            return Err(ValidationError::InvalidFieldElement(s.to_string()));
        }
        let padded = format!("{digits:0>64}");
        let raw =
            hex::decode(padded).map_err(|_| ValidationError::InvalidFieldElement(s.to_string()))?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

impl Serialize for FieldElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MODULUS_HEX: &str =
        "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001";

    #[test]
    fn modulus_matches_bn254_scalar_field() {
        assert_eq!(FieldElement::scalar_field_modulus().to_hex(), MODULUS_HEX);
    }

    #[test]
    fn modulus_is_not_in_field() {
        let p = FieldElement::scalar_field_modulus();
        assert!(!p.is_in_scalar_field());
    }

    #[test]
    fn modulus_minus_one_is_in_field() {
        let mut bytes = FieldElement::scalar_field_modulus().to_be_bytes();
        bytes[31] -= 1;
        assert!(FieldElement::from_be_bytes(bytes).is_in_scalar_field());
    }

    #[test]
    fn max_word_is_out_of_field() {
        assert!(!FieldElement::from_be_bytes([0xff; 32]).is_in_scalar_field());
    }

    #[test]
    fn reduce_modulus_is_zero() {
        let p = FieldElement::scalar_field_modulus();
        assert_eq!(FieldElement::reduce(p.as_bytes()), FieldElement::ZERO);
    }

    #[test]
    fn reduce_small_value_is_identity() {
        let v = FieldElement::from_u64(42);
        assert_eq!(FieldElement::reduce(v.as_bytes()), v);
    }

    #[test]
    fn integer_conversions() {
        assert_eq!(FieldElement::from_u64(7).to_u64(), Some(7));
        assert_eq!(FieldElement::from_u128(u128::MAX).to_u128(), Some(u128::MAX));
        assert_eq!(FieldElement::from_u128(u128::MAX).to_u64(), None);
        assert_eq!(FieldElement::from(true), FieldElement::ONE);
        assert_eq!(FieldElement::from(false), FieldElement::ZERO);
    }

    #[test]
    fn address_conversion() {
        let a = Address::repeat_byte(0x5a);
        let fe = FieldElement::from_address(&a);
        assert_eq!(fe.to_address(), Some(a));
        assert_eq!(FieldElement::from_be_bytes([1; 32]).to_address(), None);
    }

    #[test]
    fn parse_left_pads() {
        let fe: FieldElement = "0x2a".parse().unwrap();
        assert_eq!(fe, FieldElement::from_u64(42));
    }

    #[test]
    fn parse_rejects_too_long() {
        assert!("1".repeat(65).parse::<FieldElement>().is_err());
        assert!("0x".parse::<FieldElement>().is_err());
    }

    proptest! {
        #[test]
        fn reduce_always_lands_in_field(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert!(FieldElement::reduce(&bytes).is_in_scalar_field());
        }

        #[test]
        fn display_parse_roundtrip(bytes in any::<[u8; 32]>()) {
            let fe = FieldElement::from_be_bytes(bytes);
            let parsed: FieldElement = fe.to_string().parse().unwrap();
            prop_assert_eq!(parsed, fe);
        }
    }
}
