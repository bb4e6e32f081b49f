//! Shared fixture for attester unit tests.

use std::sync::Arc;

use attest_core::{
    external_nullifier, Address, Attestation, CollectionId, EventLog, FieldElement,
    GroupProperties, ManualClock, Timestamp,
};
use attest_registry::{
    AttestationsRegistry, AvailableRootsRegistry, InMemoryCommitmentMapper, SharedRegistry,
};
use attest_zkp::{MockProofSystem, ProofData, ProofPublicInputs};

use crate::accountbound::AccountboundAttester;
use crate::attester::{Attester, Collaborators};
use crate::config::AttesterConfig;
use crate::error::AttesterError;
use crate::request::{Claim, Request};
use crate::simple::SimpleAttester;

pub(crate) const CHAIN_ID: u64 = 31337;
const FIRST: u128 = 10_000_000;
const LAST: u128 = 10_000_100;

pub(crate) struct Fixture {
    pub owner: Address,
    pub config: AttesterConfig,
    pub registry: SharedRegistry,
    pub roots: Arc<AvailableRootsRegistry>,
    pub mapper: Arc<InMemoryCommitmentMapper>,
    pub clock: ManualClock,
    pub events: EventLog,
    pub nullifier: FieldElement,
    pub root: FieldElement,
}

impl Fixture {
    pub fn new() -> Self {
        let owner = Address::repeat_byte(0x01);
        let attester = Address::repeat_byte(0xa7);
        let events = EventLog::new();
        let config = AttesterConfig::new(
            attester,
            CollectionId::new(FIRST),
            CollectionId::new(LAST),
            CHAIN_ID,
        );

        let mut registry = AttestationsRegistry::new(owner, events.clone());
        registry
            .authorize_range(&owner, attester, CollectionId::new(FIRST), CollectionId::new(LAST))
            .unwrap();

        let root = FieldElement::from_u64(0x5eed);
        let roots = AvailableRootsRegistry::new(owner, events.clone());
        roots.register_root_for_attester(&owner, attester, root).unwrap();

        let mapper = InMemoryCommitmentMapper::new(
            owner,
            [FieldElement::from_u64(11), FieldElement::from_u64(22)],
            events.clone(),
        );
        events.drain();

        Self {
            owner,
            config,
            registry: registry.into_shared(),
            roots: Arc::new(roots),
            mapper: Arc::new(mapper),
            clock: ManualClock::new(0),
            events,
            nullifier: FieldElement::from_u64(0xdead_beef),
            root,
        }
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

    pub fn accountbound(&self, default_cooldown: Option<u64>) -> AccountboundAttester {
        let mut config = self.config.clone();
        config.default_cooldown_secs = default_cooldown;
        AccountboundAttester::new(&config, self.owner, self.collaborators()).unwrap()
    }

    pub fn simple(&self) -> SimpleAttester {
        SimpleAttester::new(&self.config, self.collaborators()).unwrap()
    }

    pub fn collection_id(&self, group_index: u128) -> CollectionId {
        CollectionId::new(FIRST + group_index)
    }

    pub fn submission(
        &self,
        props: &GroupProperties,
        value: u128,
        destination: Address,
    ) -> (Request, ProofData) {
        use attest_registry::CommitmentMapperRegistry;

        let inputs = ProofPublicInputs {
            destination: FieldElement::from_address(&destination),
            chain_id: FieldElement::from_u64(CHAIN_ID),
            commitment_mapper_pub_key: self.mapper.public_key(),
            registry_root: self.root,
            external_nullifier: external_nullifier(&self.config.address, props.group_index),
            nullifier: self.nullifier,
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
        value: u128,
        destination: Address,
    ) -> Result<Vec<Attestation>, AttesterError> {
        let (request, proof) = self.submission(props, value, destination);
        attester.generate_attestations(&request, &proof)
    }

    pub fn value_of(&self, group_index: u128, owner: &Address) -> u128 {
        self.registry
            .read()
            .attestation_value(self.collection_id(group_index), owner)
    }

    pub fn timestamp_of(&self, group_index: u128, owner: &Address) -> Timestamp {
        self.registry
            .read()
            .attestation_timestamp(self.collection_id(group_index), owner)
    }
}
