//! # Commitment Mapper Registry
//!
//! Holds the EdDSA public key of the off-chain commitment mapper. Proofs
//! embed the key they were built against; attesters reject proofs whose key
//! differs from the registered one.

use attest_core::{AttestError, Address, Event, EventLog, FieldElement, Ownable};
use parking_lot::RwLock;

/// Read capability consulted by attesters.
pub trait CommitmentMapperRegistry: Send + Sync {
    /// The registered public key `(x, y)`.
    fn public_key(&self) -> [FieldElement; 2];
}

#[derive(Debug)]
struct MapperState {
    ownable: Ownable,
    public_key: [FieldElement; 2],
}

/// Owner-managed commitment-mapper key.
#[derive(Debug)]
pub struct InMemoryCommitmentMapper {
    state: RwLock<MapperState>,
    events: EventLog,
}

impl InMemoryCommitmentMapper {
    /// Register the initial key.
    pub fn new(owner: Address, public_key: [FieldElement; 2], events: EventLog) -> Self {
        Self {
            state: RwLock::new(MapperState {
                ownable: Ownable::new(owner),
                public_key,
            }),
            events,
        }
    }

    /// Rotate the key. Proofs built against the old key stop passing.
    pub fn update_public_key(
        &self,
        caller: &Address,
        x: FieldElement,
        y: FieldElement,
    ) -> Result<(), AttestError> {
        let mut state = self.state.write();
        state.ownable.ensure_owner(caller)?;
        state.public_key = [x, y];
        drop(state);
        tracing::info!(x = %x, y = %y, "commitment mapper key updated");
        self.events.emit(Event::CommitmentMapperKeyUpdated { x, y });
        Ok(())
    }

    /// The current owner.
    pub fn owner(&self) -> Address {
        self.state.read().ownable.owner()
    }
}

impl CommitmentMapperRegistry for InMemoryCommitmentMapper {
    fn public_key(&self) -> [FieldElement; 2] {
        self.state.read().public_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address::repeat_byte(0x01);

    #[test]
    fn owner_rotates_key() {
        let events = EventLog::new();
        let mapper = InMemoryCommitmentMapper::new(
            OWNER,
            [FieldElement::from_u64(1), FieldElement::from_u64(2)],
            events.clone(),
        );
        mapper
            .update_public_key(&OWNER, FieldElement::from_u64(3), FieldElement::from_u64(4))
            .unwrap();
        assert_eq!(
            mapper.public_key(),
            [FieldElement::from_u64(3), FieldElement::from_u64(4)]
        );
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn non_owner_cannot_rotate() {
        let mapper = InMemoryCommitmentMapper::new(
            OWNER,
            [FieldElement::ONE, FieldElement::ONE],
            EventLog::new(),
        );
        assert!(mapper
            .update_public_key(&Address::repeat_byte(9), FieldElement::ZERO, FieldElement::ZERO)
            .is_err());
        assert_eq!(mapper.public_key(), [FieldElement::ONE, FieldElement::ONE]);
        assert_eq!(mapper.owner(), OWNER);
    }
}
