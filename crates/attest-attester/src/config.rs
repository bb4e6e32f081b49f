//! Attester configuration.
//!
//! An attester is configured with its identity, the collection-id window it
//! writes into, the chain it runs on, and its cooldown durations. Load from
//! YAML text or from environment variables.
//!
//! ```yaml
//! address: "0x1111111111111111111111111111111111111111"
//! collection_id_first: 10000000
//! collection_id_last: 10001000
//! chain_id: 1
//! default_cooldown_secs: 604800
//! cooldown_durations:
//!   5: 10
//! ```

use std::collections::BTreeMap;

use attest_core::{Address, CollectionId, CollectionRange};
use serde::{Deserialize, Serialize};

/// Static configuration of an attester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttesterConfig {
    /// Identity the attester records attestations under.
    pub address: Address,
    /// First collection id of the attester's window.
    pub collection_id_first: CollectionId,
    /// Last collection id of the attester's window (inclusive).
    pub collection_id_last: CollectionId,
    /// Chain id proofs must commit to.
    pub chain_id: u64,
    /// Cooldown applied when neither the group properties nor the
    /// per-group table name one.
    #[serde(default)]
    pub default_cooldown_secs: Option<u64>,
    /// Initial per-group-index cooldown durations, in seconds.
    #[serde(default)]
    pub cooldown_durations: BTreeMap<u128, u64>,
}

impl AttesterConfig {
    /// Config with an empty cooldown table and no default.
    pub fn new(
        address: Address,
        collection_id_first: CollectionId,
        collection_id_last: CollectionId,
        chain_id: u64,
    ) -> Self {
        Self {
            address,
            collection_id_first,
            collection_id_last,
            chain_id,
            default_cooldown_secs: None,
            cooldown_durations: BTreeMap::new(),
        }
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables.
    ///
    /// Variables:
    /// - `ATTESTER_ADDRESS` (required, 0x-prefixed 20-byte hex)
    /// - `ATTESTER_COLLECTION_ID_FIRST` (required)
    /// - `ATTESTER_COLLECTION_ID_LAST` (required)
    /// - `ATTESTER_CHAIN_ID` (required)
    /// - `ATTESTER_DEFAULT_COOLDOWN_SECS` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source; `from_env` reads the process
    /// environment through this.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| lookup(var).ok_or(ConfigError::Missing(var));

        let address = parse_var("ATTESTER_ADDRESS", &required("ATTESTER_ADDRESS")?)?;
        let first: u128 = parse_var(
            "ATTESTER_COLLECTION_ID_FIRST",
            &required("ATTESTER_COLLECTION_ID_FIRST")?,
        )?;
        let last: u128 = parse_var(
            "ATTESTER_COLLECTION_ID_LAST",
            &required("ATTESTER_COLLECTION_ID_LAST")?,
        )?;
        let chain_id = parse_var("ATTESTER_CHAIN_ID", &required("ATTESTER_CHAIN_ID")?)?;
        let default_cooldown_secs = lookup("ATTESTER_DEFAULT_COOLDOWN_SECS")
            .map(|raw| parse_var("ATTESTER_DEFAULT_COOLDOWN_SECS", &raw))
            .transpose()?;

        let config = Self {
            address,
            collection_id_first: CollectionId::new(first),
            collection_id_last: CollectionId::new(last),
            chain_id,
            default_cooldown_secs,
            cooldown_durations: BTreeMap::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the window and identity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.is_zero() {
            return Err(ConfigError::ZeroAddress);
        }
        if self.collection_id_first > self.collection_id_last {
            return Err(ConfigError::InvertedWindow {
                first: self.collection_id_first,
                last: self.collection_id_last,
            });
        }
        Ok(())
    }

    /// The authorized window `[first, last]`.
    pub fn window(&self) -> Result<CollectionRange, ConfigError> {
        CollectionRange::new(self.collection_id_first, self.collection_id_last).map_err(|_| {
            ConfigError::InvertedWindow {
                first: self.collection_id_first,
                last: self.collection_id_last,
            }
        })
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    /// A variable could not be parsed.
    #[error("invalid value for {var}: \"{value}\" ({reason})")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },
    /// `first > last`.
    #[error("collection id window is inverted: first {first} > last {last}")]
    InvertedWindow {
        /// Configured first id.
        first: CollectionId,
        /// Configured last id.
        last: CollectionId,
    },
    /// The attester address is the zero address.
    #[error("attester address must not be the zero address")]
    ZeroAddress,
    /// The YAML text could not be parsed.
    #[error("invalid attester config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
