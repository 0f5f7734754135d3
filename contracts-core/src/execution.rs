//! The execution context handed to contract entry points, exposing the syscalls
//! a Cairo 0 contract relies on: storage, events, contract calls, library calls & deployment

use serde::{Deserialize, Serialize};
use starknet::core::{
    types::FieldElement,
    utils::{get_contract_address, starknet_keccak},
};
use tracing::trace;

use crate::{contracts::ClassRegistry, errors::ExecutionError, state::State};

/// The maximum depth of nested contract & library calls
pub const MAX_CALL_DEPTH: usize = 64;

/// An event emitted during execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The address of the contract that emitted the event
    pub from_address: FieldElement,
    /// The event keys, the first of which identifies the event
    pub keys: Vec<FieldElement>,
    /// The event data
    pub data: Vec<FieldElement>,
}

impl Event {
    /// The key identifying events with the given name
    pub fn key(name: &str) -> FieldElement {
        starknet_keccak(name.as_bytes())
    }

    /// Whether the event has the given name
    pub fn is(&self, name: &str) -> bool {
        self.keys.first() == Some(&Self::key(name))
    }
}

/// The context a single entry point executes in
pub struct ExecutionContext<'a> {
    /// The state being executed against
    state: &'a mut State,
    /// The classes that can be executed
    registry: &'a ClassRegistry,
    /// The events emitted so far in the transaction
    events: &'a mut Vec<Event>,
    /// The address whose storage is being accessed
    contract_address: FieldElement,
    /// The address of the calling contract, zero for transactions
    caller_address: FieldElement,
    /// The number of enclosing calls
    depth: usize,
}

impl<'a> ExecutionContext<'a> {
    /// Creates the outermost context of a transaction, executing on behalf of the protocol
    pub fn new(
        state: &'a mut State,
        registry: &'a ClassRegistry,
        events: &'a mut Vec<Event>,
    ) -> Self {
        Self {
            state,
            registry,
            events,
            contract_address: FieldElement::ZERO,
            caller_address: FieldElement::ZERO,
            depth: 0,
        }
    }

    /// Creates a nested context
    fn child(
        &mut self,
        contract_address: FieldElement,
        caller_address: FieldElement,
    ) -> Result<ExecutionContext<'_>, ExecutionError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(ExecutionError::CallDepthExceeded);
        }

        Ok(ExecutionContext {
            state: &mut *self.state,
            registry: self.registry,
            events: &mut *self.events,
            contract_address,
            caller_address,
            depth: self.depth + 1,
        })
    }

    /// The address of the executing contract
    pub fn contract_address(&self) -> FieldElement {
        self.contract_address
    }

    /// The address of the calling contract
    pub fn caller_address(&self) -> FieldElement {
        self.caller_address
    }

    /// The nonce of the executing contract
    pub fn nonce(&self) -> Result<u64, ExecutionError> {
        self.state.nonce(self.contract_address)
    }

    /// Whether the class has been declared
    pub fn is_declared(&self, class_hash: FieldElement) -> bool {
        self.state.is_declared(class_hash)
    }

    /// Reads a storage slot of the executing contract
    pub fn storage_read(&self, key: FieldElement) -> Result<FieldElement, ExecutionError> {
        self.state.storage_at(self.contract_address, key)
    }

    /// Writes a storage slot of the executing contract
    pub fn storage_write(
        &mut self,
        key: FieldElement,
        value: FieldElement,
    ) -> Result<(), ExecutionError> {
        self.state.set_storage_at(self.contract_address, key, value)
    }

    /// Emits an event from the executing contract
    pub fn emit_event(&mut self, name: &str, data: Vec<FieldElement>) {
        self.events.push(Event {
            from_address: self.contract_address,
            keys: vec![Event::key(name)],
            data,
        });
    }

    /// Calls an entry point of another contract, in that contract's storage context
    pub fn call_contract(
        &mut self,
        to: FieldElement,
        selector: FieldElement,
        calldata: &[FieldElement],
    ) -> Result<Vec<FieldElement>, ExecutionError> {
        let class_hash = self.state.class_hash_at(to)?;
        let registry = self.registry;
        let class = registry.get(class_hash)?;

        trace!("calling {selector:#x} on {} at {to:#x}", class.name());
        let caller = self.contract_address;
        let mut ctx = self.child(to, caller)?;
        class.execute(&mut ctx, selector, calldata)
    }

    /// Executes an entry point of a declared class in the executing contract's storage
    /// context, preserving the caller
    pub fn library_call(
        &mut self,
        class_hash: FieldElement,
        selector: FieldElement,
        calldata: &[FieldElement],
    ) -> Result<Vec<FieldElement>, ExecutionError> {
        if !self.state.is_declared(class_hash) {
            return Err(ExecutionError::ClassNotDeclared { class_hash });
        }
        let registry = self.registry;
        let class = registry.get(class_hash)?;

        trace!("library calling {selector:#x} on {}", class.name());
        let (contract_address, caller) = (self.contract_address, self.caller_address);
        let mut ctx = self.child(contract_address, caller)?;
        class.execute(&mut ctx, selector, calldata)
    }

    /// Deploys an instance of a declared class & runs its constructor, returning the
    /// address it was deployed at
    pub fn deploy(
        &mut self,
        class_hash: FieldElement,
        salt: FieldElement,
        constructor_calldata: &[FieldElement],
        deployer_address: FieldElement,
    ) -> Result<FieldElement, ExecutionError> {
        let registry = self.registry;
        let class = registry.get(class_hash)?;

        let address =
            get_contract_address(salt, class_hash, constructor_calldata, deployer_address);
        self.state.deploy_contract(address, class_hash)?;

        trace!("deploying {} at {address:#x}", class.name());
        let caller = self.contract_address;
        let mut ctx = self.child(address, caller)?;
        class.constructor(&mut ctx, constructor_calldata)?;

        Ok(address)
    }
}
