//! # Ownership
//!
//! Owner-privileged operations (range authorization, pause, cooldown
//! configuration, root publication) check the caller against an explicit
//! [`Ownable`] field. The owner only changes through
//! [`Ownable::transfer_ownership`], which validates the caller first.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{AttestError, AuthorizationError, ValidationError};

/// Single-writer owner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    /// Set the initial owner.
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// The current owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Fail unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), AuthorizationError> {
        if *caller != self.owner {
            return Err(AuthorizationError::NotOwner {
                caller: *caller,
                owner: self.owner,
            });
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`. Returns the previous owner.
    ///
    /// # Errors
    ///
    /// [`AuthorizationError::NotOwner`] if `caller` is not the owner;
    /// [`ValidationError::ZeroAddress`] if `new_owner` is the zero address.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, AttestError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(ValidationError::ZeroAddress("owner").into());
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        Ok(previous)
    }
}
