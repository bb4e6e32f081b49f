//! Shared harness: a registry, roots registry, commitment mapper and mock
//! verifier wired together, with a manual clock starting at zero.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use attest_attester::{
    AccountboundAttester, Attester, AttesterConfig, AttesterError, Claim, Collaborators, Request,
    SimpleAttester,
};
use attest_core::{
    external_nullifier, Address, Attestation, CollectionId, EventLog, FieldElement,
    GroupProperties, ManualClock,
};
use attest_registry::{
    AttestationsRegistry, AvailableRootsRegistry, CommitmentMapperRegistry, InMemoryBadges,
    InMemoryCommitmentMapper, SharedRegistry,
};
use attest_zkp::{MockProofSystem, ProofData, ProofPublicInputs};

pub const OWNER: Address = Address::repeat_byte(0x01);
pub const ATTESTER: Address = Address::repeat_byte(0xa7);
pub const CHAIN_ID: u64 = 1;
pub const FIRST: u128 = 10_000_000;
pub const LAST: u128 = 10_000_999;

static TRACING: Once = Once::new();

/// Install a test subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub struct Stack {
    pub registry: SharedRegistry,
    pub roots: Arc<AvailableRootsRegistry>,
    pub mapper: Arc<InMemoryCommitmentMapper>,
    pub badges: Arc<InMemoryBadges>,
    pub clock: ManualClock,
    pub events: EventLog,
    pub root: FieldElement,
}

impl Stack {
    pub fn new() -> Self {
        init_tracing();
        let events = EventLog::new();
        let badges = Arc::new(InMemoryBadges::new());
        let mut registry =
            AttestationsRegistry::new(OWNER, events.clone()).with_badge_mirror(badges.clone());
        registry
            .authorize_range(&OWNER, ATTESTER, CollectionId::new(FIRST), CollectionId::new(LAST))
            .unwrap();

        let root = FieldElement::from_u64(0x0123_4567);
        let roots = AvailableRootsRegistry::new(OWNER, events.clone());
        roots.register_root_for_attester(&OWNER, ATTESTER, root).unwrap();

        let mapper = InMemoryCommitmentMapper::new(
            OWNER,
            [FieldElement::from_u64(0x11), FieldElement::from_u64(0x22)],
            events.clone(),
        );
        events.drain();

        Self {
            registry: registry.into_shared(),
            roots: Arc::new(roots),
            mapper: Arc::new(mapper),
            badges,
            clock: ManualClock::new(0),
            events,
            root,
        }
    }

    pub fn config(&self) -> AttesterConfig {
        AttesterConfig::new(
            ATTESTER,
            CollectionId::new(FIRST),
            CollectionId::new(LAST),
            CHAIN_ID,
        )
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            registry: self.registry.clone(),
            roots: self.roots.clone(),
            commitment_mapper: self.mapper.clone(),
            verifier: Arc::new(MockProofSystem),
            clock: Arc::new(self.clock.clone()),
            events: self.events.clone(),
        }
    }

    pub fn accountbound(&self, config: &AttesterConfig) -> AccountboundAttester {
        AccountboundAttester::new(config, OWNER, self.collaborators()).unwrap()
    }

    pub fn simple(&self) -> SimpleAttester {
        SimpleAttester::new(&self.config(), self.collaborators()).unwrap()
    }

    /// An honest request and mock proof for `nullifier` claiming `value`
    /// in `props` for `destination`.
    pub fn submission(
        &self,
        props: &GroupProperties,
        nullifier: FieldElement,
        value: u128,
        destination: Address,
    ) -> (Request, ProofData) {
        let inputs = ProofPublicInputs {
            destination: FieldElement::from_address(&destination),
            chain_id: FieldElement::from_u64(CHAIN_ID),
            commitment_mapper_pub_key: self.mapper.public_key(),
            registry_root: self.root,
            external_nullifier: external_nullifier(&ATTESTER, props.group_index),
            nullifier,
            claimed_value: FieldElement::from_u128(value),
            accounts_tree_value: *props.group_id().as_field(),
            is_strict: FieldElement::from(!props.is_score),
        };
        let proof = MockProofSystem.prove(&inputs.to_vec()).unwrap();
        (Request::single(Claim::for_group(props, value), destination), proof)
    }

    pub fn generate(
        &self,
        attester: &dyn Attester,
        props: &GroupProperties,
        nullifier: FieldElement,
        value: u128,
        destination: Address,
    ) -> Result<Vec<Attestation>, AttesterError> {
        let (request, proof) = self.submission(props, nullifier, value, destination);
        attester.generate_attestations(&request, &proof)
    }

    pub fn collection_id(group_index: u128) -> CollectionId {
        CollectionId::new(FIRST + group_index)
    }

    pub fn has(&self, group_index: u128, owner: &Address) -> bool {
        self.registry
            .read()
            .has_attestation(Self::collection_id(group_index), owner)
    }

    pub fn value(&self, group_index: u128, owner: &Address) -> u128 {
        self.registry
            .read()
            .attestation_value(Self::collection_id(group_index), owner)
    }
}
