//! The network client abstraction the deploy scripts & tests are written against

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use contracts_common::{abi::ContractAbi, types::Call};
use starknet::core::types::FieldElement;

use crate::errors::ClientError;

/// The directory, under the artifacts path, in which contract ABIs are kept
pub const ABIS_DIR: &str = "abis";
/// The extension of compiled contract & ABI artifacts
pub const ARTIFACT_EXTENSION: &str = "json";

/// A contract to be declared: its name & where its compiled artifacts live
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractSource {
    /// The contract name, e.g. `MystisNFT`
    pub name: String,
    /// The directory holding the compiled artifacts
    pub artifacts_path: PathBuf,
}

impl ContractSource {
    /// Constructs a contract source
    pub fn new<P: AsRef<Path>>(name: &str, artifacts_path: P) -> Self {
        Self {
            name: name.to_string(),
            artifacts_path: artifacts_path.as_ref().to_path_buf(),
        }
    }

    /// The path of the compiled contract class, `<artifacts>/<Name>.json`
    pub fn compiled_path(&self) -> PathBuf {
        self.artifacts_path
            .join(&self.name)
            .with_extension(ARTIFACT_EXTENSION)
    }

    /// The path of the contract ABI, `<artifacts>/abis/<Name>.json`
    pub fn abi_path(&self) -> PathBuf {
        self.artifacts_path
            .join(ABIS_DIR)
            .join(&self.name)
            .with_extension(ARTIFACT_EXTENSION)
    }
}

/// The outcome of a declaration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeclareResult {
    /// The hash of the declared class
    pub class_hash: FieldElement,
    /// The hash of the declaration transaction
    pub transaction_hash: FieldElement,
}

/// The outcome of a deployment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeployResult {
    /// The address of the deployed contract
    pub address: FieldElement,
    /// The hash of the deployment transaction
    pub transaction_hash: FieldElement,
}

/// A signer-bound session with a network
#[async_trait]
pub trait StarknetClient: Send + Sync {
    /// The address of the account transactions are sent from
    fn address(&self) -> FieldElement;

    /// Declares a contract class
    async fn declare(&self, source: &ContractSource) -> Result<DeclareResult, ClientError>;

    /// Loads the ABI of a contract class
    async fn contract_abi(&self, source: &ContractSource) -> Result<ContractAbi, ClientError>;

    /// Deploys an instance of a declared class through the universal deployer
    async fn deploy(
        &self,
        class_hash: FieldElement,
        constructor_calldata: Vec<FieldElement>,
        salt: FieldElement,
    ) -> Result<DeployResult, ClientError>;

    /// Sends a multicall from the account, returning the transaction hash
    async fn execute(
        &self,
        calls: Vec<Call>,
        max_fee: Option<FieldElement>,
    ) -> Result<FieldElement, ClientError>;

    /// Calls a view function without sending a transaction
    async fn call(&self, call: Call) -> Result<Vec<FieldElement>, ClientError>;

    /// Waits until the transaction is accepted
    async fn wait_for_tx(&self, transaction_hash: FieldElement) -> Result<(), ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let source = ContractSource::new("MystisNFT", "artifacts");

        assert_eq!(source.compiled_path(), PathBuf::from("artifacts/MystisNFT.json"));
        assert_eq!(source.abi_path(), PathBuf::from("artifacts/abis/MystisNFT.json"));
    }
}
