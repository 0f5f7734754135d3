//! Transaction hashing & receipts on the devnet

use contracts_common::{encoding::str_to_felt, errors::EncodingError, types::Call};
use contracts_core::{contracts::account::encode_execute_calldata, execution::Event};
use serde::{Deserialize, Serialize};
use starknet::core::{crypto::compute_hash_on_elements, types::FieldElement};

/// The prefix of invoke transaction hashes
pub const INVOKE_PREFIX: &str = "invoke";
/// The prefix of declare transaction hashes
pub const DECLARE_PREFIX: &str = "declare";
/// The transaction version signed over
pub const TRANSACTION_VERSION: u8 = 1;

/// The fields a transaction hash commits to
#[derive(Clone, Copy, Debug)]
pub struct TransactionFields {
    /// The sending account
    pub sender: FieldElement,
    /// The maximum fee the sender is willing to pay
    pub max_fee: FieldElement,
    /// The chain the transaction is bound to
    pub chain_id: FieldElement,
    /// The sender's nonce
    pub nonce: u64,
}

/// Hashes a transaction with the given prefix & payload
fn transaction_hash(
    prefix: &str,
    fields: TransactionFields,
    payload: &[FieldElement],
) -> Result<FieldElement, EncodingError> {
    Ok(compute_hash_on_elements(&[
        str_to_felt(prefix)?,
        FieldElement::from(TRANSACTION_VERSION),
        fields.sender,
        FieldElement::ZERO,
        compute_hash_on_elements(payload),
        fields.max_fee,
        fields.chain_id,
        FieldElement::from(fields.nonce),
    ]))
}

/// The hash of a multicall sent from an account
pub fn invoke_transaction_hash(
    fields: TransactionFields,
    calls: &[Call],
) -> Result<FieldElement, EncodingError> {
    transaction_hash(INVOKE_PREFIX, fields, &encode_execute_calldata(calls))
}

/// The hash of a class declaration sent from an account
pub fn declare_transaction_hash(
    fields: TransactionFields,
    class_hash: FieldElement,
) -> Result<FieldElement, EncodingError> {
    transaction_hash(DECLARE_PREFIX, fields, &[class_hash])
}

/// The finality status of an executed transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// The transaction executed & its state changes were applied
    AcceptedOnL2,
    /// The transaction failed & none of its state changes were applied
    Reverted,
}

/// The receipt of an executed transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// The hash of the transaction
    pub transaction_hash: FieldElement,
    /// Whether the transaction was applied
    pub status: TxStatus,
    /// The events emitted, empty if the transaction reverted
    pub events: Vec<Event>,
    /// The reason the transaction reverted, if it did
    pub revert_reason: Option<String>,
    /// The block the transaction was included in
    pub block_number: u64,
}

impl TxReceipt {
    /// Whether the transaction was applied
    pub fn is_accepted(&self) -> bool {
        self.status == TxStatus::AcceptedOnL2
    }

    /// The events with the given name emitted by the given contract
    pub fn events_named<'a>(
        &'a self,
        from_address: FieldElement,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Event> + 'a {
        self.events
            .iter()
            .filter(move |event| event.from_address == from_address && event.is(name))
    }
}
