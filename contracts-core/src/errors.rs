//! Errors stemming from contract execution

use contracts_common::errors::EncodingError;
use starknet::core::types::FieldElement;
use thiserror::Error;

use crate::contracts::{
    account::AccountError,
    components::{erc721::Erc721Error, ownable::OwnableError, proxy::ProxyError},
    nft::NftError,
};

/// Errors that can occur while executing a contract entry point.
///
/// Any error aborts the enclosing transaction, and none of its state changes are kept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// A proxy check failed
    #[error(transparent)]
    Proxy(#[from] ProxyError),
    /// An ownership check failed
    #[error(transparent)]
    Ownable(#[from] OwnableError),
    /// A token check failed
    #[error(transparent)]
    Erc721(#[from] Erc721Error),
    /// A collection check failed
    #[error(transparent)]
    Nft(#[from] NftError),
    /// An account check failed
    #[error(transparent)]
    Account(#[from] AccountError),
    /// The calldata did not match the entry point's inputs
    #[error("invalid calldata: {0}")]
    Calldata(#[from] EncodingError),
    /// The invoked selector is not exposed by the executing class
    #[error("Entry point {selector:#x} not found in contract")]
    EntryPointNotFound {
        /// The selector that was invoked
        selector: FieldElement,
    },
    /// The class hash has not been declared
    #[error("class with hash {class_hash:#x} is not declared")]
    ClassNotDeclared {
        /// The unknown class hash
        class_hash: FieldElement,
    },
    /// No contract class is registered under the given name
    #[error("unknown contract class `{0}`")]
    UnknownClass(String),
    /// No contract is deployed at the given address
    #[error("contract {address:#x} is not deployed")]
    ContractNotDeployed {
        /// The address that was called
        address: FieldElement,
    },
    /// A contract is already deployed at the given address
    #[error("contract {address:#x} is already deployed")]
    ContractAlreadyDeployed {
        /// The colliding address
        address: FieldElement,
    },
    /// The transaction signature does not match the account's public key
    #[error("invalid transaction signature for account {account:#x}")]
    InvalidSignature {
        /// The sending account
        account: FieldElement,
    },
    /// The transaction nonce does not match the account's nonce
    #[error("invalid transaction nonce: expected {expected}, got {actual}")]
    InvalidNonce {
        /// The account's current nonce
        expected: u64,
        /// The nonce carried by the transaction
        actual: u64,
    },
    /// Entry points called each other too deeply, e.g. a proxy delegating to itself
    #[error("call depth exceeded")]
    CallDepthExceeded,
    /// A storage variable name is not a valid identifier
    #[error("invalid storage variable `{0}`")]
    InvalidStorageVar(String),
    /// A revert reported by a live network, carrying the reason it gave
    #[error("{0}")]
    Remote(String),
}

impl ExecutionError {
    /// The revert reason raised by the contract itself, if the error stems from
    /// one of its assertions rather than from the execution environment
    pub fn revert_reason(&self) -> Option<String> {
        match self {
            ExecutionError::Proxy(_)
            | ExecutionError::Ownable(_)
            | ExecutionError::Erc721(_)
            | ExecutionError::Nft(_)
            | ExecutionError::Account(_)
            | ExecutionError::Remote(_) => Some(self.to_string()),
            _ => None,
        }
    }
}
