//! Typed access to contract storage variables.
//!
//! Storage variables are laid out the way Cairo 0 `@storage_var`s are: a variable lives at
//! `sn_keccak(name)`, hashed with each of its keys, and a `Uint256` value occupies that slot
//! and the one following it.

use contracts_common::types::Uint256;
use serde::{Deserialize, Serialize};
use starknet::core::{types::FieldElement, utils::get_storage_var_address};
use std::collections::HashMap;

use crate::{errors::ExecutionError, execution::ExecutionContext};

/// The raw key-value storage of a single contract
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractStorage(HashMap<FieldElement, FieldElement>);

impl ContractStorage {
    /// Reads a slot, unset slots read as zero
    pub fn read(&self, key: FieldElement) -> FieldElement {
        self.0.get(&key).copied().unwrap_or(FieldElement::ZERO)
    }

    /// Writes a slot
    pub fn write(&mut self, key: FieldElement, value: FieldElement) {
        if value == FieldElement::ZERO {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    /// The number of non-zero slots
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether every slot is zero
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A named storage variable
#[derive(Clone, Copy, Debug)]
pub struct StorageVar {
    /// The variable name, as declared in the contract
    name: &'static str,
}

impl StorageVar {
    /// Declares a storage variable
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// The variable name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The base address of the variable for the given keys
    pub fn address(&self, keys: &[FieldElement]) -> Result<FieldElement, ExecutionError> {
        get_storage_var_address(self.name, keys)
            .map_err(|_| ExecutionError::InvalidStorageVar(self.name.to_string()))
    }

    /// Reads a single field element
    pub fn read(
        &self,
        ctx: &ExecutionContext,
        keys: &[FieldElement],
    ) -> Result<FieldElement, ExecutionError> {
        ctx.storage_read(self.address(keys)?)
    }

    /// Writes a single field element
    pub fn write(
        &self,
        ctx: &mut ExecutionContext,
        keys: &[FieldElement],
        value: FieldElement,
    ) -> Result<(), ExecutionError> {
        ctx.storage_write(self.address(keys)?, value)
    }

    /// Reads a `Uint256`, low limb first
    pub fn read_uint256(
        &self,
        ctx: &ExecutionContext,
        keys: &[FieldElement],
    ) -> Result<Uint256, ExecutionError> {
        let address = self.address(keys)?;
        let low = ctx.storage_read(address)?;
        let high = ctx.storage_read(address + FieldElement::ONE)?;
        Ok(Uint256::from_felts(low, high)?)
    }

    /// Writes a `Uint256`, low limb first
    pub fn write_uint256(
        &self,
        ctx: &mut ExecutionContext,
        keys: &[FieldElement],
        value: Uint256,
    ) -> Result<(), ExecutionError> {
        let address = self.address(keys)?;
        let [low, high] = value.to_felts();
        ctx.storage_write(address, low)?;
        ctx.storage_write(address + FieldElement::ONE, high)
    }

    /// Reads a boolean flag
    pub fn read_bool(
        &self,
        ctx: &ExecutionContext,
        keys: &[FieldElement],
    ) -> Result<bool, ExecutionError> {
        Ok(self.read(ctx, keys)? != FieldElement::ZERO)
    }
}
