//! # Error Hierarchy
//!
//! Structured error types for the attestation stack, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Every failing operation is atomic: it discards all of its effects and
//! returns one of these errors. The categories:
//!
//! - [`AuthorizationError`]: caller lacks the required capability.
//! - [`ValidationError`]: malformed or inconsistent input.
//! - [`CrossCheckError`]: a proof public input disagrees with the claim or
//!   with on-ledger state. Carries both expected and actual values.
//! - [`PolicyError`]: the sybil-resistance policy refuses the change.
//! - [`LifecycleError`]: the component is paused.
//!
//! Cryptographic verification failures are defined next to the verifier
//! (`attest-zkp`) and wrapped by the attester.

use thiserror::Error;

use crate::address::Address;
use crate::collection::CollectionId;
use crate::field::FieldElement;
use crate::time::Timestamp;

/// Top-level error type for registry and attester operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttestError {
    /// Caller lacks the required capability.
    #[error("authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    /// Input failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A proof public input disagrees with the claim or ledger state.
    #[error("cross-check error: {0}")]
    CrossCheck(#[from] CrossCheckError),

    /// The nullifier policy refused the change.
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Operation attempted in the wrong lifecycle state.
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

/// The caller is not allowed to perform the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// An owner-only operation was called by someone else.
    #[error("caller {caller} is not the owner ({owner})")]
    NotOwner {
        /// Who called.
        caller: Address,
        /// The current owner.
        owner: Address,
    },

    /// The issuer has no range covering the collection id.
    #[error("issuer {issuer} is not authorized for collection {collection_id}")]
    IssuerNotAuthorized {
        /// The calling issuer.
        issuer: Address,
        /// The collection it tried to write.
        collection_id: CollectionId,
    },

    /// An attestation names an issuer other than the caller.
    #[error("caller {caller} cannot record an attestation issued by {issuer}")]
    IssuerMismatch {
        /// Who called.
        caller: Address,
        /// The issuer named in the attestation.
        issuer: Address,
    },
}

/// Input is malformed or internally inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address text is not 20 hex-encoded bytes.
    #[error("invalid address: \"{0}\" (expected 20 hex-encoded bytes)")]
    InvalidAddress(String),

    /// Field element text is not up to 32 hex-encoded bytes.
    #[error("invalid field element: \"{0}\" (expected up to 64 hex digits)")]
    InvalidFieldElement(String),

    /// The zero address is not a valid account here.
    #[error("the zero address is not allowed as {0}")]
    ZeroAddress(&'static str),

    /// A range with `min > max`.
    #[error("inverted collection range: min {min} > max {max}")]
    InvertedRange {
        /// Lower bound supplied.
        min: CollectionId,
        /// Upper bound supplied.
        max: CollectionId,
    },

    /// Range removal referenced an index past the end of the issuer's list.
    #[error("range index {index} out of bounds for issuer {issuer} ({length} ranges)")]
    RangeIndexOutOfBounds {
        /// The issuer whose ranges were addressed.
        issuer: Address,
        /// Number of ranges the issuer holds.
        length: usize,
        /// The index supplied.
        index: usize,
    },

    /// Range removal supplied bounds that differ from the stored range.
    #[error(
        "range mismatch for issuer {issuer} at index {index}: stored [{expected_min}, {expected_max}], supplied [{min}, {max}]"
    )]
    RangeMismatch {
        /// The issuer whose ranges were addressed.
        issuer: Address,
        /// The index supplied.
        index: usize,
        /// Stored lower bound.
        expected_min: CollectionId,
        /// Stored upper bound.
        expected_max: CollectionId,
        /// Supplied lower bound.
        min: CollectionId,
        /// Supplied upper bound.
        max: CollectionId,
    },

    /// Plural range removal named the same index twice.
    #[error("range index {index} supplied more than once for issuer {issuer}")]
    DuplicateRangeIndex {
        /// The issuer whose ranges were addressed.
        issuer: Address,
        /// The repeated index.
        index: usize,
    },

    /// Two parallel input lists differ in length.
    #[error("{what}: lengths differ ({left} vs {right})")]
    LengthMismatch {
        /// Which lists.
        what: &'static str,
        /// Length of the first list.
        left: usize,
        /// Length of the second list.
        right: usize,
    },

    /// The derived collection id lies outside the attester's window.
    #[error("collection id {collection_id} out of bounds [{first}, {last}]")]
    CollectionIdOutOfBound {
        /// Derived collection id (`first + groupIndex`), if it did not overflow.
        collection_id: CollectionId,
        /// First collection id of the attester's window.
        first: CollectionId,
        /// Last collection id of the attester's window.
        last: CollectionId,
    },

    /// The claim's declared group id is not the hash of its properties.
    #[error("group id and properties mismatch: expected {expected}, declared {declared}")]
    GroupIdAndPropertiesMismatch {
        /// Group id recomputed from the encoded properties.
        expected: FieldElement,
        /// Group id declared in the claim.
        declared: FieldElement,
    },

    /// A request must carry exactly one claim.
    #[error("request must carry exactly one claim, got {0}")]
    ClaimsLengthNotOne(usize),

    /// Encoded group properties could not be decoded.
    #[error("malformed group properties ({len} bytes): {reason}")]
    MalformedGroupProperties {
        /// Length of the payload.
        len: usize,
        /// What was wrong.
        reason: String,
    },

    /// Attestation extra data could not be decoded.
    #[error("malformed attestation extra data ({len} bytes)")]
    MalformedExtraData {
        /// Length of the payload.
        len: usize,
    },

    /// The proof carries the wrong number of public inputs.
    #[error("expected {expected} public inputs, got {actual}")]
    PublicInputsLength {
        /// Required count.
        expected: usize,
        /// Supplied count.
        actual: usize,
    },
}

/// A proof public input disagrees with the claim or with ledger state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrossCheckError {
    /// Proof destination differs from the claim destination.
    #[error("destination mismatch: claim {expected}, proof {actual}")]
    DestinationMismatch {
        /// Claim destination.
        expected: Address,
        /// Destination word in the proof.
        actual: FieldElement,
    },

    /// Proof chain id differs from the executing chain.
    #[error("chain id mismatch: executing chain {expected}, proof {actual}")]
    ChainIdMismatch {
        /// Executing chain id.
        expected: u64,
        /// Chain id word in the proof.
        actual: FieldElement,
    },

    /// Proof claimed value differs from the claim.
    #[error("claimed value mismatch: claim {expected}, proof {actual}")]
    ValueMismatch {
        /// Claimed value in the request.
        expected: u128,
        /// Value word in the proof.
        actual: FieldElement,
    },

    /// The proof's accounts tree does not correspond to the claim's group.
    #[error("accounts tree value mismatch: claim group {expected}, proof group {actual}")]
    AccountsTreeValueMismatch {
        /// Group id declared in the claim.
        expected: FieldElement,
        /// Accounts tree value in the proof.
        actual: FieldElement,
    },

    /// The proof's strictness flag contradicts the group's score flag.
    #[error("isStrict mismatch: expected {expected}, proof {actual}")]
    IsStrictMismatch {
        /// `!isScore` from the group properties.
        expected: bool,
        /// isStrict word in the proof.
        actual: FieldElement,
    },

    /// The proof's external nullifier is not the one this attester derives.
    #[error("external nullifier mismatch: expected {expected}, proof {actual}")]
    ExternalNullifierMismatch {
        /// Derived from `(attester, groupIndex)`.
        expected: FieldElement,
        /// External nullifier in the proof.
        actual: FieldElement,
    },

    /// The proof's registry root is not currently trusted for this attester.
    #[error("registry root {root} is not available for attester {attester}")]
    RegistryRootNotAvailable {
        /// The attester asking.
        attester: Address,
        /// Root embedded in the proof.
        root: FieldElement,
    },

    /// The proof's commitment-mapper key differs from the registered key.
    #[error(
        "commitment mapper public key mismatch: registered ({expected_x}, {expected_y}), proof ({actual_x}, {actual_y})"
    )]
    CommitmentMapperPubKeyMismatch {
        /// Registered key, x coordinate.
        expected_x: FieldElement,
        /// Registered key, y coordinate.
        expected_y: FieldElement,
        /// Proof key, x coordinate.
        actual_x: FieldElement,
        /// Proof key, y coordinate.
        actual_y: FieldElement,
    },
}

/// The nullifier policy refuses the requested change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A single-use nullifier is already bound to another destination.
    #[error("nullifier {nullifier} already used by {destination}")]
    NullifierUsed {
        /// The nullifier.
        nullifier: FieldElement,
        /// Destination it is bound to.
        destination: Address,
    },

    /// Rebinding attempted before the cooldown elapsed.
    #[error(
        "nullifier {nullifier} (bound to {destination}, burn count {burn_count}) is on cooldown since {cooldown_start} for {cooldown_duration}s"
    )]
    NullifierOnCooldown {
        /// The nullifier.
        nullifier: FieldElement,
        /// Destination it is currently bound to.
        destination: Address,
        /// Start of the current cooldown window.
        cooldown_start: Timestamp,
        /// Times the destination has changed so far.
        burn_count: u16,
        /// The cooldown that applies.
        cooldown_duration: u64,
    },

    /// No cooldown duration is configured for the group index.
    #[error("cooldown duration not set for group index {group_index}")]
    CooldownDurationNotSet {
        /// The group index.
        group_index: u128,
    },

    /// The burn counter cannot grow any further.
    #[error("burn count of nullifier {nullifier} is exhausted")]
    BurnCountExhausted {
        /// The nullifier.
        nullifier: FieldElement,
    },
}

/// Operation attempted in the wrong lifecycle state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Writes are rejected while paused.
    #[error("operation rejected: contract is paused")]
    Paused,

    /// Pause requested while already paused, or unpause while running.
    #[error("contract is already {0}")]
    AlreadyInState(&'static str),
}
