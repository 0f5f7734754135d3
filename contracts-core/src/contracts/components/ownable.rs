//! Mirrors OpenZeppelin's Cairo 0 `Ownable` library for access controls:
//! https://github.com/OpenZeppelin/cairo-contracts/blob/v0.5.0/src/openzeppelin/access/ownable/library.cairo

use contracts_common::constants::{NOT_OWNER_MSG, OWNERSHIP_TRANSFERRED_EVENT_NAME, ZERO_OWNER_MSG};
use starknet::core::types::FieldElement;
use thiserror::Error;

use crate::{errors::ExecutionError, execution::ExecutionContext, storage::StorageVar};

/// The owner of the contract
const OWNABLE_OWNER: StorageVar = StorageVar::new("Ownable_owner");

/// Errors raised by ownership checks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OwnableError {
    /// The caller is not the owner
    #[error("{}", NOT_OWNER_MSG)]
    NotOwner,
    /// Ownership was transferred to the zero address
    #[error("{}", ZERO_OWNER_MSG)]
    ZeroOwner,
}

/// The `Ownable` component
pub struct Ownable;

impl Ownable {
    /// Sets the initial owner
    pub fn initializer(
        ctx: &mut ExecutionContext,
        owner: FieldElement,
    ) -> Result<(), ExecutionError> {
        Self::_transfer_ownership(ctx, owner)
    }

    /// The current owner
    pub fn owner(ctx: &ExecutionContext) -> Result<FieldElement, ExecutionError> {
        OWNABLE_OWNER.read(ctx, &[])
    }

    /// Asserts that the caller is the owner
    pub fn assert_only_owner(ctx: &ExecutionContext) -> Result<(), ExecutionError> {
        let caller = ctx.caller_address();
        if caller == FieldElement::ZERO || caller != Self::owner(ctx)? {
            return Err(OwnableError::NotOwner.into());
        }
        Ok(())
    }

    /// Transfers ownership to a new, non-zero owner. Only callable by the owner.
    pub fn transfer_ownership(
        ctx: &mut ExecutionContext,
        new_owner: FieldElement,
    ) -> Result<(), ExecutionError> {
        if new_owner == FieldElement::ZERO {
            return Err(OwnableError::ZeroOwner.into());
        }
        Self::assert_only_owner(ctx)?;
        Self::_transfer_ownership(ctx, new_owner)
    }

    /// Sets the owner unconditionally
    fn _transfer_ownership(
        ctx: &mut ExecutionContext,
        new_owner: FieldElement,
    ) -> Result<(), ExecutionError> {
        let previous_owner = Self::owner(ctx)?;
        OWNABLE_OWNER.write(ctx, &[], new_owner)?;
        ctx.emit_event(OWNERSHIP_TRANSFERRED_EVENT_NAME, vec![previous_owner, new_owner]);
        Ok(())
    }
}
