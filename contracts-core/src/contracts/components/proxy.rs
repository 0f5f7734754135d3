//! Mirrors OpenZeppelin's Cairo 0 `Proxy` library, which holds the state of an
//! upgradeable contract:
//! https://github.com/OpenZeppelin/cairo-contracts/blob/v0.5.0/src/openzeppelin/upgrades/library.cairo
//!
//! The variables below live in the proxy's storage. The proxy contract only reads the
//! implementation hash; the implementation, executing in the proxy's storage context through
//! a library call, manages all of them.

use contracts_common::constants::{
    ADMIN_CHANGED_EVENT_NAME, ALREADY_INITIALIZED_MSG, NOT_ADMIN_MSG, UPGRADED_EVENT_NAME,
    ZERO_ADMIN_MSG, ZERO_IMPLEMENTATION_MSG,
};
use starknet::core::types::FieldElement;
use thiserror::Error;

use crate::{errors::ExecutionError, execution::ExecutionContext, storage::StorageVar};

/// The class hash of the implementation
const PROXY_IMPLEMENTATION_HASH: StorageVar = StorageVar::new("Proxy_implementation_hash");
/// The address allowed to upgrade the implementation
const PROXY_ADMIN: StorageVar = StorageVar::new("Proxy_admin");
/// Whether the proxy has been initialized
const PROXY_INITIALIZED: StorageVar = StorageVar::new("Proxy_initialized");

/// Errors raised by proxy checks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The proxy has already been initialized
    #[error("{}", ALREADY_INITIALIZED_MSG)]
    AlreadyInitialized,
    /// The caller is not the proxy admin
    #[error("{}", NOT_ADMIN_MSG)]
    NotAdmin,
    /// The admin was set to the zero address
    #[error("{}", ZERO_ADMIN_MSG)]
    ZeroAdmin,
    /// The implementation was set to the zero class hash
    #[error("{}", ZERO_IMPLEMENTATION_MSG)]
    ZeroImplementation,
}

/// The `Proxy` component
pub struct Proxy;

impl Proxy {
    /// Marks the proxy as initialized & sets its admin. Can only succeed once.
    pub fn initializer(
        ctx: &mut ExecutionContext,
        proxy_admin: FieldElement,
    ) -> Result<(), ExecutionError> {
        Self::assert_not_initialized(ctx)?;
        if proxy_admin == FieldElement::ZERO {
            return Err(ProxyError::ZeroAdmin.into());
        }

        PROXY_INITIALIZED.write(ctx, &[], FieldElement::ONE)?;
        Self::_set_admin(ctx, proxy_admin)
    }

    /// Asserts that the proxy has not been initialized yet
    pub fn assert_not_initialized(ctx: &ExecutionContext) -> Result<(), ExecutionError> {
        if PROXY_INITIALIZED.read_bool(ctx, &[])? {
            return Err(ProxyError::AlreadyInitialized.into());
        }
        Ok(())
    }

    /// Asserts that the caller is the proxy admin
    pub fn assert_only_admin(ctx: &ExecutionContext) -> Result<(), ExecutionError> {
        let caller = ctx.caller_address();
        if caller == FieldElement::ZERO || caller != Self::get_admin(ctx)? {
            return Err(ProxyError::NotAdmin.into());
        }
        Ok(())
    }

    /// The current implementation class hash
    pub fn get_implementation_hash(ctx: &ExecutionContext) -> Result<FieldElement, ExecutionError> {
        PROXY_IMPLEMENTATION_HASH.read(ctx, &[])
    }

    /// The current admin
    pub fn get_admin(ctx: &ExecutionContext) -> Result<FieldElement, ExecutionError> {
        PROXY_ADMIN.read(ctx, &[])
    }

    /// Replaces the admin. Only callable by the admin.
    pub fn set_admin(
        ctx: &mut ExecutionContext,
        new_admin: FieldElement,
    ) -> Result<(), ExecutionError> {
        Self::assert_only_admin(ctx)?;
        if new_admin == FieldElement::ZERO {
            return Err(ProxyError::ZeroAdmin.into());
        }
        Self::_set_admin(ctx, new_admin)
    }

    /// Replaces the implementation. Only callable by the admin.
    pub fn upgrade(
        ctx: &mut ExecutionContext,
        new_implementation: FieldElement,
    ) -> Result<(), ExecutionError> {
        Self::assert_only_admin(ctx)?;
        Self::_set_implementation_hash(ctx, new_implementation)
    }

    /// Sets the implementation unconditionally, rejecting only the zero class hash
    pub fn _set_implementation_hash(
        ctx: &mut ExecutionContext,
        new_implementation: FieldElement,
    ) -> Result<(), ExecutionError> {
        if new_implementation == FieldElement::ZERO {
            return Err(ProxyError::ZeroImplementation.into());
        }

        PROXY_IMPLEMENTATION_HASH.write(ctx, &[], new_implementation)?;
        ctx.emit_event(UPGRADED_EVENT_NAME, vec![new_implementation]);
        Ok(())
    }

    /// Sets the admin unconditionally
    fn _set_admin(
        ctx: &mut ExecutionContext,
        new_admin: FieldElement,
    ) -> Result<(), ExecutionError> {
        let previous_admin = Self::get_admin(ctx)?;
        PROXY_ADMIN.write(ctx, &[], new_admin)?;
        ctx.emit_event(ADMIN_CHANGED_EVENT_NAME, vec![previous_admin, new_admin]);
        Ok(())
    }
}
