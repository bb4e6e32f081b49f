//! # attest-registry — Attestation Registry
//!
//! The authoritative store of attestations and of which issuer may write
//! which collections.
//!
//! ## Components
//!
//! - [`AttestationsRegistry`] (`registry.rs`): storage keyed by
//!   `(collectionId, owner)`, one record per key. Every mutation goes
//!   through a single atomic write batch: the whole batch is checked
//!   (pause switch, issuer identity, authorization) before any record
//!   changes.
//! - [`AuthorizedRanges`] (`ranges.rs`): per-issuer lists of inclusive
//!   collection windows. Removal is index-addressed and must restate the
//!   exact stored bounds.
//! - [`BadgeMirror`] (`badges.rs`): receives the balance delta of every
//!   write. Not authoritative; a failed notification never rolls back the
//!   write.
//! - [`RootsRegistry`] / [`CommitmentMapperRegistry`] (`roots.rs`,
//!   `commitment_mapper.rs`): the read-only capabilities attesters consult,
//!   with owner-managed in-memory implementations.
//!
//! ## Call Direction
//!
//! Attester → registry (write), registry → badge mirror (notify). Nothing
//! calls back into its caller.

pub mod badges;
pub mod commitment_mapper;
pub mod ranges;
pub mod registry;
pub mod roots;

// Re-export primary types.
pub use badges::{BadgeError, BadgeMirror, BalanceDelta, InMemoryBadges};
pub use commitment_mapper::{CommitmentMapperRegistry, InMemoryCommitmentMapper};
pub use ranges::AuthorizedRanges;
pub use registry::{AttestationsRegistry, RegistryWrite, SharedRegistry};
pub use roots::{AvailableRootsRegistry, RootsRegistry};
