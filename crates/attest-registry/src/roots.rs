//! # Available Roots Registry
//!
//! Merkle roots of the registry tree that attesters accept in proofs. A root
//! is trusted for an attester if it was registered for that attester or for
//! all attesters. Only the owner publishes or withdraws roots.

use std::collections::{HashMap, HashSet};

use attest_core::{AttestError, Address, Event, EventLog, FieldElement, Ownable, ValidationError};
use parking_lot::RwLock;

/// Read capability consulted by attesters.
pub trait RootsRegistry: Send + Sync {
    /// Whether `root` is currently trusted for `attester`.
    fn is_root_available_for_attester(&self, attester: &Address, root: &FieldElement) -> bool;
}

#[derive(Debug)]
struct RootsState {
    ownable: Ownable,
    per_attester: HashMap<Address, HashSet<FieldElement>>,
    global: HashSet<FieldElement>,
}

/// Owner-managed roots registry.
#[derive(Debug)]
pub struct AvailableRootsRegistry {
    state: RwLock<RootsState>,
    events: EventLog,
}

impl AvailableRootsRegistry {
    /// Create an empty registry owned by `owner`.
    pub fn new(owner: Address, events: EventLog) -> Self {
        Self {
            state: RwLock::new(RootsState {
                ownable: Ownable::new(owner),
                per_attester: HashMap::new(),
                global: HashSet::new(),
            }),
            events,
        }
    }

    /// The current owner.
    pub fn owner(&self) -> Address {
        self.state.read().ownable.owner()
    }

    /// Trust `root` for `attester` only.
    pub fn register_root_for_attester(
        &self,
        caller: &Address,
        attester: Address,
        root: FieldElement,
    ) -> Result<(), AttestError> {
        let mut state = self.state.write();
        state.ownable.ensure_owner(caller)?;
        if attester.is_zero() {
            return Err(ValidationError::ZeroAddress("attester").into());
        }
        state.per_attester.entry(attester).or_default().insert(root);
        drop(state);
        tracing::info!(attester = %attester, root = %root, "root registered for attester");
        self.events.emit(Event::RootRegistered {
            attester: Some(attester),
            root,
        });
        Ok(())
    }

    /// Withdraw `root` from `attester`. Withdrawing an unknown root is a no-op
    /// apart from the event.
    pub fn unregister_root_for_attester(
        &self,
        caller: &Address,
        attester: Address,
        root: FieldElement,
    ) -> Result<(), AttestError> {
        let mut state = self.state.write();
        state.ownable.ensure_owner(caller)?;
        if attester.is_zero() {
            return Err(ValidationError::ZeroAddress("attester").into());
        }
        if let Some(roots) = state.per_attester.get_mut(&attester) {
            roots.remove(&root);
            if roots.is_empty() {
                state.per_attester.remove(&attester);
            }
        }
        drop(state);
        tracing::info!(attester = %attester, root = %root, "root unregistered for attester");
        self.events.emit(Event::RootUnregistered {
            attester: Some(attester),
            root,
        });
        Ok(())
    }

    /// Trust `root` for every attester.
    pub fn register_root_for_all(&self, caller: &Address, root: FieldElement) -> Result<(), AttestError> {
        let mut state = self.state.write();
        state.ownable.ensure_owner(caller)?;
        state.global.insert(root);
        drop(state);
        tracing::info!(root = %root, "root registered for all attesters");
        self.events.emit(Event::RootRegistered {
            attester: None,
            root,
        });
        Ok(())
    }

    /// Withdraw a globally trusted root. Per-attester registrations of the
    /// same root are unaffected.
    pub fn unregister_root_for_all(&self, caller: &Address, root: FieldElement) -> Result<(), AttestError> {
        let mut state = self.state.write();
        state.ownable.ensure_owner(caller)?;
        state.global.remove(&root);
        drop(state);
        tracing::info!(root = %root, "root unregistered for all attesters");
        self.events.emit(Event::RootUnregistered {
            attester: None,
            root,
        });
        Ok(())
    }

    /// Whether `root` is trusted for every attester.
    pub fn is_root_available_for_all(&self, root: &FieldElement) -> bool {
        self.state.read().global.contains(root)
    }

    /// Hand ownership to `new_owner`.
    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> Result<(), AttestError> {
        let previous = self.state.write().ownable.transfer_ownership(caller, new_owner)?;
        self.events.emit(Event::OwnershipTransferred {
            previous_owner: previous,
            new_owner,
        });
        Ok(())
    }
}

impl RootsRegistry for AvailableRootsRegistry {
    fn is_root_available_for_attester(&self, attester: &Address, root: &FieldElement) -> bool {
        let state = self.state.read();
        state.global.contains(root)
            || state
                .per_attester
                .get(attester)
                .is_some_and(|roots| roots.contains(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_core::AuthorizationError;

    const OWNER: Address = Address::repeat_byte(0x01);
    const ATTESTER: Address = Address::repeat_byte(0xa1);
    const OTHER: Address = Address::repeat_byte(0xa2);

    fn registry() -> AvailableRootsRegistry {
        AvailableRootsRegistry::new(OWNER, EventLog::new())
    }

    #[test]
    fn per_attester_root_is_scoped() {
        let roots = registry();
        let root = FieldElement::from_u64(77);
        roots.register_root_for_attester(&OWNER, ATTESTER, root).unwrap();
        assert!(roots.is_root_available_for_attester(&ATTESTER, &root));
        assert!(!roots.is_root_available_for_attester(&OTHER, &root));
        assert!(!roots.is_root_available_for_all(&root));

        roots.unregister_root_for_attester(&OWNER, ATTESTER, root).unwrap();
        assert!(!roots.is_root_available_for_attester(&ATTESTER, &root));
    }

    #[test]
    fn global_root_applies_to_everyone() {
        let roots = registry();
        let root = FieldElement::from_u64(5);
        roots.register_root_for_all(&OWNER, root).unwrap();
        assert!(roots.is_root_available_for_attester(&ATTESTER, &root));
        assert!(roots.is_root_available_for_attester(&OTHER, &root));

        roots.unregister_root_for_all(&OWNER, root).unwrap();
        assert!(!roots.is_root_available_for_attester(&OTHER, &root));
    }

    #[test]
    fn global_withdrawal_keeps_attester_registration() {
        let roots = registry();
        let root = FieldElement::from_u64(5);
        roots.register_root_for_attester(&OWNER, ATTESTER, root).unwrap();
        roots.register_root_for_all(&OWNER, root).unwrap();
        roots.unregister_root_for_all(&OWNER, root).unwrap();
        assert!(roots.is_root_available_for_attester(&ATTESTER, &root));
    }

    #[test]
    fn non_owner_cannot_publish() {
        let roots = registry();
        let err = roots
            .register_root_for_all(&OTHER, FieldElement::ONE)
            .unwrap_err();
        assert!(matches!(
            err,
            AttestError::Authorization(AuthorizationError::NotOwner { .. })
        ));
        assert!(!roots.is_root_available_for_all(&FieldElement::ONE));
    }

    #[test]
    fn zero_attester_rejected() {
        let roots = registry();
        let err = roots
            .register_root_for_attester(&OWNER, Address::ZERO, FieldElement::ONE)
            .unwrap_err();
        assert!(matches!(
            err,
            AttestError::Validation(ValidationError::ZeroAddress("attester"))
        ));
    }

    #[test]
    fn registration_emits_events() {
        let events = EventLog::new();
        let roots = AvailableRootsRegistry::new(OWNER, events.clone());
        roots.register_root_for_all(&OWNER, FieldElement::ONE).unwrap();
        roots
            .register_root_for_attester(&OWNER, ATTESTER, FieldElement::ONE)
            .unwrap();
        assert_eq!(
            events.snapshot(),
            vec![
                Event::RootRegistered {
                    attester: None,
                    root: FieldElement::ONE
                },
                Event::RootRegistered {
                    attester: Some(ATTESTER),
                    root: FieldElement::ONE
                },
            ]
        );
    }

    #[test]
    fn ownership_transfer() {
        let roots = registry();
        roots.transfer_ownership(&OWNER, OTHER).unwrap();
        assert_eq!(roots.owner(), OTHER);
        assert!(roots.register_root_for_all(&OWNER, FieldElement::ONE).is_err());
        assert!(roots.register_root_for_all(&OTHER, FieldElement::ONE).is_ok());
    }
}
