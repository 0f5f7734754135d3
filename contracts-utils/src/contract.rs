//! A deployed contract bound to an ABI & a client, calling entry points by name

use std::{fmt, sync::Arc};

use contracts_common::{
    abi::{function_selector, ContractAbi},
    types::Call,
};
use starknet::core::types::FieldElement;
use tracing::debug;

use crate::{client::StarknetClient, errors::ClientError};

/// A deployed contract, seen through an ABI & the client that talks to it.
///
/// Rebinding the ABI is how a proxy is addressed as its implementation.
#[derive(Clone)]
pub struct ContractHandle {
    /// The address of the contract
    address: FieldElement,
    /// The ABI functions are resolved against
    abi: ContractAbi,
    /// The client calls & transactions go through
    client: Arc<dyn StarknetClient>,
}

impl fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &format_args!("{:#x}", self.address))
            .field("client", &format_args!("{:#x}", self.client.address()))
            .finish()
    }
}

impl ContractHandle {
    /// Binds a contract address to an ABI & a client
    pub fn new(address: FieldElement, abi: ContractAbi, client: Arc<dyn StarknetClient>) -> Self {
        Self {
            address,
            abi,
            client,
        }
    }

    /// The address of the contract
    pub fn address(&self) -> FieldElement {
        self.address
    }

    /// The ABI the contract is bound to
    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    /// The same contract seen through another ABI
    pub fn with_abi(&self, abi: ContractAbi) -> Self {
        Self {
            abi,
            ..self.clone()
        }
    }

    /// The same contract, sending transactions from another account
    pub fn with_client(&self, client: Arc<dyn StarknetClient>) -> Self {
        Self {
            client,
            ..self.clone()
        }
    }

    /// Builds a call to the named function, for bundling into a multicall
    pub fn call_to(&self, name: &str, calldata: Vec<FieldElement>) -> Result<Call, ClientError> {
        let function = self
            .abi
            .function(name)
            .ok_or_else(|| ClientError::UnknownFunction(name.to_string()))?;

        Ok(Call {
            to: self.address,
            selector: function_selector(function)?,
            calldata,
        })
    }

    /// Calls a view function
    pub async fn call(
        &self,
        name: &str,
        calldata: Vec<FieldElement>,
    ) -> Result<Vec<FieldElement>, ClientError> {
        debug!("Calling {name} on contract {:#x}...", self.address);
        let call = self.call_to(name, calldata)?;
        self.client.call(call).await
    }

    /// Invokes an external function & waits for the transaction to be accepted
    pub async fn invoke(
        &self,
        name: &str,
        calldata: Vec<FieldElement>,
    ) -> Result<FieldElement, ClientError> {
        debug!("Invoking {name} on contract {:#x}...", self.address);
        let call = self.call_to(name, calldata)?;
        let transaction_hash = self.client.execute(vec![call], None).await?;
        self.client.wait_for_tx(transaction_hash).await?;

        Ok(transaction_hash)
    }
}
