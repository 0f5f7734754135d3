//! Errors stemming from interacting with a network

use contracts_common::errors::EncodingError;
use contracts_core::errors::ExecutionError;
use starknet::core::types::FieldElement;
use thiserror::Error;

/// Errors that can occur while talking to a network through a client
#[derive(Debug, Error)]
pub enum ClientError {
    /// A call failed during execution
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// A transaction was executed & reverted
    #[error("transaction {transaction_hash:#x} reverted: {source}")]
    Reverted {
        /// The hash of the reverted transaction
        transaction_hash: FieldElement,
        /// The reason for the revert
        source: ExecutionError,
    },
    /// The JSON-RPC provider or account returned an error
    #[error("provider error: {0}")]
    Provider(String),
    /// A compiled contract or ABI artifact could not be read
    #[error("error reading artifact: {0}")]
    Artifact(String),
    /// A devnet state file could not be read or written
    #[error("error accessing devnet state: {0}")]
    StateFile(String),
    /// No receipt exists for the transaction
    #[error("transaction {0:#x} not found")]
    TransactionNotFound(FieldElement),
    /// The transaction was not accepted within the polling bound
    #[error("timed out waiting for transaction {0:#x}")]
    Timeout(FieldElement),
    /// A value could not be encoded or decoded
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// A function name is absent from the ABI a contract handle is bound to
    #[error("function `{0}` not found in contract ABI")]
    UnknownFunction(String),
    /// A transaction could not be signed
    #[error("error signing transaction: {0}")]
    Signing(String),
    /// An account's `getPublicKey` did not return exactly one felt
    #[error("account {0:#x} returned no public key")]
    MissingPublicKey(FieldElement),
    /// The devnet state lock was poisoned by a panicking holder
    #[error("devnet state lock poisoned")]
    StatePoisoned,
}

impl ClientError {
    /// The revert reason raised by a contract, if the error stems from one of its assertions
    pub fn revert_reason(&self) -> Option<String> {
        match self {
            ClientError::Execution(e) | ClientError::Reverted { source: e, .. } => {
                e.revert_reason()
            },
            _ => None,
        }
    }

    /// The execution error behind the failure, if the failure happened during execution
    pub fn execution_error(&self) -> Option<&ExecutionError> {
        match self {
            ClientError::Execution(e) | ClientError::Reverted { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
