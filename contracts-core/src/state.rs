//! The global state of a network: declared classes & deployed contracts

use serde::{Deserialize, Serialize};
use starknet::core::types::FieldElement;
use std::collections::HashMap;

use crate::{errors::ExecutionError, storage::ContractStorage};

/// A deployed contract instance
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    /// The class the contract is an instance of
    pub class_hash: FieldElement,
    /// The contract's storage
    pub storage: ContractStorage,
    /// The number of transactions the contract has sent, if it is an account
    pub nonce: u64,
}

/// Declared classes & deployed contracts
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// The names of declared classes, keyed by class hash
    classes: HashMap<FieldElement, String>,
    /// Deployed contracts, keyed by address
    contracts: HashMap<FieldElement, DeployedContract>,
}

/// A frozen copy of the state, restorable to discard later changes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot(State);

impl State {
    /// Records a class declaration, returning whether it was already declared
    pub fn declare_class(&mut self, class_hash: FieldElement, name: &str) -> bool {
        self.classes.insert(class_hash, name.to_string()).is_some()
    }

    /// Whether the class has been declared
    pub fn is_declared(&self, class_hash: FieldElement) -> bool {
        self.classes.contains_key(&class_hash)
    }

    /// The name of a declared class
    pub fn class_name(&self, class_hash: FieldElement) -> Option<&str> {
        self.classes.get(&class_hash).map(String::as_str)
    }

    /// Deploys an instance of a declared class at the given address
    pub fn deploy_contract(
        &mut self,
        address: FieldElement,
        class_hash: FieldElement,
    ) -> Result<(), ExecutionError> {
        if !self.is_declared(class_hash) {
            return Err(ExecutionError::ClassNotDeclared { class_hash });
        }
        if self.contracts.contains_key(&address) {
            return Err(ExecutionError::ContractAlreadyDeployed { address });
        }

        self.contracts.insert(
            address,
            DeployedContract {
                class_hash,
                ..Default::default()
            },
        );
        Ok(())
    }

    /// Whether a contract is deployed at the given address
    pub fn is_deployed(&self, address: FieldElement) -> bool {
        self.contracts.contains_key(&address)
    }

    /// The contract deployed at the given address
    pub fn contract(&self, address: FieldElement) -> Result<&DeployedContract, ExecutionError> {
        self.contracts
            .get(&address)
            .ok_or(ExecutionError::ContractNotDeployed { address })
    }

    /// The contract deployed at the given address, mutably
    fn contract_mut(
        &mut self,
        address: FieldElement,
    ) -> Result<&mut DeployedContract, ExecutionError> {
        self.contracts
            .get_mut(&address)
            .ok_or(ExecutionError::ContractNotDeployed { address })
    }

    /// The class hash of the contract deployed at the given address
    pub fn class_hash_at(&self, address: FieldElement) -> Result<FieldElement, ExecutionError> {
        self.contract(address).map(|contract| contract.class_hash)
    }

    /// Reads a storage slot of a deployed contract
    pub fn storage_at(
        &self,
        address: FieldElement,
        key: FieldElement,
    ) -> Result<FieldElement, ExecutionError> {
        self.contract(address).map(|contract| contract.storage.read(key))
    }

    /// Writes a storage slot of a deployed contract
    pub fn set_storage_at(
        &mut self,
        address: FieldElement,
        key: FieldElement,
        value: FieldElement,
    ) -> Result<(), ExecutionError> {
        self.contract_mut(address)?.storage.write(key, value);
        Ok(())
    }

    /// The nonce of a deployed contract
    pub fn nonce(&self, address: FieldElement) -> Result<u64, ExecutionError> {
        self.contract(address).map(|contract| contract.nonce)
    }

    /// Increments the nonce of a deployed contract
    pub fn increment_nonce(&mut self, address: FieldElement) -> Result<(), ExecutionError> {
        self.contract_mut(address)?.nonce += 1;
        Ok(())
    }

    /// The number of deployed contracts
    pub fn num_contracts(&self) -> usize {
        self.contracts.len()
    }

    /// Freezes a copy of the state
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot(self.clone())
    }

    /// Discards every change made since the snapshot was taken
    pub fn restore(&mut self, snapshot: &StateSnapshot) {
        *self = snapshot.0.clone();
    }
}

impl From<StateSnapshot> for State {
    fn from(snapshot: StateSnapshot) -> Self {
        snapshot.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_requires_declared_class() {
        let mut state = State::default();
        let class_hash = FieldElement::from(1_u8);
        let address = FieldElement::from(2_u8);

        assert_eq!(
            state.deploy_contract(address, class_hash),
            Err(ExecutionError::ClassNotDeclared { class_hash })
        );

        state.declare_class(class_hash, "Account");
        state.deploy_contract(address, class_hash).unwrap();
        assert_eq!(
            state.deploy_contract(address, class_hash),
            Err(ExecutionError::ContractAlreadyDeployed { address })
        );
    }

    #[test]
    fn test_restore_discards_changes() {
        let mut state = State::default();
        let class_hash = FieldElement::from(1_u8);
        let address = FieldElement::from(2_u8);
        state.declare_class(class_hash, "Account");
        state.deploy_contract(address, class_hash).unwrap();

        let snapshot = state.snapshot();
        state.set_storage_at(address, FieldElement::ONE, FieldElement::from(9_u8)).unwrap();
        state.increment_nonce(address).unwrap();

        state.restore(&snapshot);
        assert_eq!(state.storage_at(address, FieldElement::ONE).unwrap(), FieldElement::ZERO);
        assert_eq!(state.nonce(address).unwrap(), 0);
    }
}
