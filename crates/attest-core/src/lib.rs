#![deny(missing_docs)]

//! # attest-core — Foundational Types for the Attestation Stack
//!
//! Every other crate in the workspace depends on this one. It has no
//! internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtypes for domain primitives.** An [`Address`] is not a
//!    [`FieldElement`], and a [`CollectionId`] is not a group index. Proof
//!    public inputs are field elements; converting them back into accounts
//!    or values is explicit and fallible.
//!
//! 2. **One error taxonomy.** [`AttestError`] wraps one enum per failure
//!    category (authorization, validation, cross-check, policy, lifecycle).
//!    Every variant carries the values needed to diagnose it.
//!
//! 3. **Typed extra data.** The `{nullifier, burnCount}` payload stored with
//!    accountbound attestations is [`AttestationExtraData`] with explicit
//!    `encode`/`decode`, never an ad hoc byte slice.
//!
//! 4. **Deterministic time.** Components read time through the [`Clock`]
//!    trait so cooldown behavior can be tested with a [`ManualClock`].

pub mod address;
pub mod attestation;
pub mod collection;
pub mod error;
pub mod event;
pub mod field;
pub mod group;
pub mod ownable;
pub mod time;

// Re-export primary types at crate root for ergonomic imports.
pub use address::Address;
pub use attestation::{Attestation, AttestationData, AttestationExtraData};
pub use collection::{CollectionId, CollectionRange};
pub use error::{
    AttestError, AuthorizationError, CrossCheckError, LifecycleError, PolicyError,
    ValidationError,
};
pub use event::{Event, EventLog};
pub use field::FieldElement;
pub use group::{external_nullifier, GroupId, GroupProperties};
pub use ownable::Ownable;
pub use time::{Clock, ManualClock, SystemClock, Timestamp};
