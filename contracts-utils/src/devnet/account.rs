//! An account on the devnet, signing its transactions with a local key

use async_trait::async_trait;
use contracts_common::{
    abi::ContractAbi,
    calldata::CalldataSerializable,
    constants::{DEPLOY_CONTRACT_FN_NAME, UDC_ADDRESS},
    encoding::{hex_to_felt, selector},
    types::Call,
};
use contracts_core::contracts::udc::udc_deployment_address;
use starknet::core::types::FieldElement;
use tracing::debug;

use crate::{
    client::{ContractSource, DeclareResult, DeployResult, StarknetClient},
    errors::ClientError,
    signer::MockSigner,
};

use super::{
    transaction::{declare_transaction_hash, invoke_transaction_hash},
    Devnet,
};

/// An account deployed on a devnet
#[derive(Clone, Debug)]
pub struct DevnetAccount {
    /// The devnet the account lives on
    devnet: Devnet,
    /// The address of the account contract
    address: FieldElement,
    /// The signer controlling the account
    signer: MockSigner,
}

impl DevnetAccount {
    /// Wraps an already deployed account
    pub fn new(devnet: Devnet, address: FieldElement, signer: MockSigner) -> Self {
        Self {
            devnet,
            address,
            signer,
        }
    }

    /// The address of the account contract
    pub fn address(&self) -> FieldElement {
        self.address
    }

    /// The devnet the account lives on
    pub fn devnet(&self) -> &Devnet {
        &self.devnet
    }

    /// The signer controlling the account
    pub fn signer(&self) -> &MockSigner {
        &self.signer
    }

    /// The nonce the account's next transaction must carry
    pub fn nonce(&self) -> Result<u64, ClientError> {
        self.devnet.nonce(self.address)
    }
}

#[async_trait]
impl StarknetClient for DevnetAccount {
    fn address(&self) -> FieldElement {
        self.address
    }

    async fn declare(&self, source: &ContractSource) -> Result<DeclareResult, ClientError> {
        let class_hash = self.devnet.class_hash(&source.name)?;
        let nonce = self.nonce()?;
        let fields = self.devnet.transaction_fields(self.address, FieldElement::ZERO, nonce);
        let signature = self.signer.sign(&declare_transaction_hash(fields, class_hash)?)?;

        let transaction_hash =
            self.devnet
                .declare(self.address, class_hash, FieldElement::ZERO, nonce, &signature)?;
        Ok(DeclareResult {
            class_hash,
            transaction_hash,
        })
    }

    async fn contract_abi(&self, source: &ContractSource) -> Result<ContractAbi, ClientError> {
        Ok(self.devnet.registry().get_by_name(&source.name)?.abi().clone())
    }

    async fn deploy(
        &self,
        class_hash: FieldElement,
        constructor_calldata: Vec<FieldElement>,
        salt: FieldElement,
    ) -> Result<DeployResult, ClientError> {
        let udc_address = hex_to_felt(UDC_ADDRESS)?;
        let address = udc_deployment_address(
            udc_address,
            self.address,
            class_hash,
            salt,
            false, /* unique */
            &constructor_calldata,
        );

        let mut calldata = vec![class_hash, salt, FieldElement::ZERO];
        calldata.extend(constructor_calldata.to_calldata());
        let deploy_call = Call {
            to: udc_address,
            selector: selector(DEPLOY_CONTRACT_FN_NAME)?,
            calldata,
        };

        let transaction_hash = self.execute(vec![deploy_call], None).await?;
        debug!("Deployed class {class_hash:#x} at {address:#x}");
        Ok(DeployResult {
            address,
            transaction_hash,
        })
    }

    async fn execute(
        &self,
        calls: Vec<Call>,
        max_fee: Option<FieldElement>,
    ) -> Result<FieldElement, ClientError> {
        let max_fee = max_fee.unwrap_or(FieldElement::ZERO);
        let nonce = self.nonce()?;
        let fields = self.devnet.transaction_fields(self.address, max_fee, nonce);
        let signature = self.signer.sign(&invoke_transaction_hash(fields, &calls)?)?;

        self.devnet
            .invoke(self.address, &calls, max_fee, nonce, &signature)
    }

    async fn call(&self, call: Call) -> Result<Vec<FieldElement>, ClientError> {
        self.devnet.call(&call)
    }

    async fn wait_for_tx(&self, transaction_hash: FieldElement) -> Result<(), ClientError> {
        // Devnet transactions are final as soon as they are sent
        self.devnet.receipt(transaction_hash).map(|_| ())
    }
}
