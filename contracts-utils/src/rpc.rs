//! An account on a live network, reached over JSON-RPC

use std::{fs::File, sync::Arc, time::Duration};

use async_trait::async_trait;
use contracts_common::{
    abi::ContractAbi, constants::UDC_ADDRESS, encoding::hex_to_felt, types::Call,
};
use contracts_core::{contracts::udc::udc_deployment_address, errors::ExecutionError};
use starknet::{
    accounts::{
        Account, Call as AccountCall, ConnectedAccount, ExecutionEncoding, SingleOwnerAccount,
    },
    contract::ContractFactory,
    core::types::{
        contract::legacy::LegacyContractClass, BlockId, BlockTag, ExecutionResult, FieldElement,
        FunctionCall, MaybePendingTransactionReceipt, TransactionReceipt,
    },
    providers::{jsonrpc::HttpTransport, JsonRpcClient, Provider},
    signers::LocalWallet,
};
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;

use crate::{
    client::{ContractSource, DeclareResult, DeployResult, StarknetClient},
    errors::ClientError,
    signer::MockSigner,
};

/// The default interval between transaction status polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
/// The default number of transaction status polls before giving up
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60;

/// The account type used to sign & send transactions over JSON-RPC
pub type RpcSingleOwnerAccount = SingleOwnerAccount<JsonRpcClient<HttpTransport>, LocalWallet>;

/// An account on a live network
pub struct RpcAccount {
    /// The underlying signing account
    account: RpcSingleOwnerAccount,
    /// The interval between transaction status polls
    poll_interval: Duration,
    /// The number of polls before a transaction is deemed lost
    max_poll_attempts: u32,
}

impl RpcAccount {
    /// Connects to the account at the given address through a JSON-RPC endpoint
    pub fn new(
        rpc_url: Url,
        address: FieldElement,
        private_key: FieldElement,
        chain_id: FieldElement,
    ) -> Self {
        let provider = JsonRpcClient::new(HttpTransport::new(rpc_url));
        let wallet = MockSigner::new(private_key).wallet();

        Self {
            account: SingleOwnerAccount::new(
                provider,
                wallet,
                address,
                chain_id,
                ExecutionEncoding::Legacy,
            ),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }

    /// Overrides how transaction acceptance is polled for
    pub fn with_polling(mut self, poll_interval: Duration, max_poll_attempts: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_poll_attempts = max_poll_attempts;
        self
    }

    /// Reads a compiled Cairo 0 contract class from the artifacts directory
    fn read_contract_class(source: &ContractSource) -> Result<LegacyContractClass, ClientError> {
        let path = source.compiled_path();
        let file = File::open(&path)
            .map_err(|e| ClientError::Artifact(format!("{}: {e}", path.display())))?;
        serde_json::from_reader(file)
            .map_err(|e| ClientError::Artifact(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl StarknetClient for RpcAccount {
    fn address(&self) -> FieldElement {
        self.account.address()
    }

    async fn declare(&self, source: &ContractSource) -> Result<DeclareResult, ClientError> {
        let contract_class = Self::read_contract_class(source)?;
        let result = self
            .account
            .declare_legacy(Arc::new(contract_class))
            .send()
            .await
            .map_err(|e| ClientError::Provider(e.to_string()))?;

        info!("Declared {} with class hash {:#x}", source.name, result.class_hash);
        Ok(DeclareResult {
            class_hash: result.class_hash,
            transaction_hash: result.transaction_hash,
        })
    }

    async fn contract_abi(&self, source: &ContractSource) -> Result<ContractAbi, ClientError> {
        ContractAbi::from_file(source.abi_path())
            .map_err(|e| ClientError::Artifact(format!("{}: {e}", source.abi_path().display())))
    }

    async fn deploy(
        &self,
        class_hash: FieldElement,
        constructor_calldata: Vec<FieldElement>,
        salt: FieldElement,
    ) -> Result<DeployResult, ClientError> {
        let address = udc_deployment_address(
            hex_to_felt(UDC_ADDRESS)?,
            self.address(),
            class_hash,
            salt,
            false, /* unique */
            &constructor_calldata,
        );

        let factory = ContractFactory::new(class_hash, &self.account);
        let result = factory
            .deploy(constructor_calldata, salt, false /* unique */)
            .send()
            .await
            .map_err(|e| ClientError::Provider(e.to_string()))?;

        debug!("Deployed class {class_hash:#x} at {address:#x}");
        Ok(DeployResult {
            address,
            transaction_hash: result.transaction_hash,
        })
    }

    async fn execute(
        &self,
        calls: Vec<Call>,
        max_fee: Option<FieldElement>,
    ) -> Result<FieldElement, ClientError> {
        let calls = calls
            .into_iter()
            .map(|call| AccountCall {
                to: call.to,
                selector: call.selector,
                calldata: call.calldata,
            })
            .collect();

        let mut execution = self.account.execute(calls);
        if let Some(max_fee) = max_fee {
            execution = execution.max_fee(max_fee);
        }

        let result = execution
            .send()
            .await
            .map_err(|e| ClientError::Provider(e.to_string()))?;
        Ok(result.transaction_hash)
    }

    async fn call(&self, call: Call) -> Result<Vec<FieldElement>, ClientError> {
        self.account
            .provider()
            .call(
                FunctionCall {
                    contract_address: call.to,
                    entry_point_selector: call.selector,
                    calldata: call.calldata,
                },
                BlockId::Tag(BlockTag::Latest),
            )
            .await
            .map_err(|e| ClientError::Provider(e.to_string()))
    }

    async fn wait_for_tx(&self, transaction_hash: FieldElement) -> Result<(), ClientError> {
        for attempt in 0..self.max_poll_attempts {
            match self
                .account
                .provider()
                .get_transaction_receipt(transaction_hash)
                .await
            {
                Ok(MaybePendingTransactionReceipt::Receipt(receipt)) => {
                    check_execution(transaction_hash, execution_result(&receipt))?;
                    debug!("Transaction {transaction_hash:#x} accepted");
                    return Ok(());
                },
                Ok(MaybePendingTransactionReceipt::PendingReceipt(_)) => {
                    debug!("Transaction {transaction_hash:#x} pending (attempt {attempt})")
                },
                Err(e) => debug!("Transaction {transaction_hash:#x} not yet known: {e}"),
            }

            sleep(self.poll_interval).await;
        }

        Err(ClientError::Timeout(transaction_hash))
    }
}

/// The execution result carried by a receipt, whatever the transaction type
fn execution_result(receipt: &TransactionReceipt) -> &ExecutionResult {
    match receipt {
        TransactionReceipt::Invoke(receipt) => &receipt.execution_result,
        TransactionReceipt::L1Handler(receipt) => &receipt.execution_result,
        TransactionReceipt::Declare(receipt) => &receipt.execution_result,
        TransactionReceipt::Deploy(receipt) => &receipt.execution_result,
        TransactionReceipt::DeployAccount(receipt) => &receipt.execution_result,
    }
}

/// Fails with the network's revert reason if an included transaction reverted
fn check_execution(
    transaction_hash: FieldElement,
    result: &ExecutionResult,
) -> Result<(), ClientError> {
    match result {
        ExecutionResult::Succeeded => Ok(()),
        ExecutionResult::Reverted { reason } => Err(ClientError::Reverted {
            transaction_hash,
            source: ExecutionError::Remote(reason.clone()),
        }),
    }
}
