//! A single-signer account contract, modelled on OpenZeppelin's Cairo 0 `Account`.
//!
//! Transactions are signed over their hash with the Stark curve key stored at construction;
//! the network verifies the signature & nonce before calling `__execute__`, which dispatches
//! every call of the multicall with the account as the caller.

use contracts_common::{
    abi::{ContractAbi, FELT_ARRAY_TYPE, FELT_TYPE},
    calldata::{CalldataReader, CalldataSerializable},
    constants::{
        ACCOUNT_CONTRACT_NAME, EXECUTE_FN_NAME, GET_NONCE_FN_NAME, GET_PUBLIC_KEY_FN_NAME,
    },
    encoding::felt_to_usize,
    types::Call,
};
use starknet::core::types::FieldElement;
use thiserror::Error;

use crate::{errors::ExecutionError, execution::ExecutionContext, storage::StorageVar};

use super::ContractClass;

/// The public key the account's transactions are signed with
const ACCOUNT_PUBLIC_KEY: StorageVar = StorageVar::new("Account_public_key");

/// The number of field elements in an entry of the call array
const CALL_ARRAY_ENTRY_LEN: usize = 4;

/// Errors raised by account checks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// `__execute__` was called by another contract rather than the protocol
    #[error("Account: reentrant call")]
    ReentrantCall,
    /// A call's calldata range lies outside the flattened calldata
    #[error("Account: call array out of bounds")]
    CallArrayOutOfBounds,
}

/// Encodes a multicall in the account's `__execute__` layout: a call array of
/// `(to, selector, data_offset, data_len)` entries, followed by the flattened calldata
pub fn encode_execute_calldata(calls: &[Call]) -> Vec<FieldElement> {
    let mut call_array = vec![FieldElement::from(calls.len())];
    let mut flattened: Vec<FieldElement> = Vec::new();
    for call in calls {
        call_array.extend([
            call.to,
            call.selector,
            FieldElement::from(flattened.len()),
            FieldElement::from(call.calldata.len()),
        ]);
        flattened.extend(call.calldata.iter().copied());
    }

    call_array.extend(flattened.to_calldata());
    call_array
}

/// Decodes a multicall from the account's `__execute__` layout
pub fn decode_execute_calldata(calldata: &[FieldElement]) -> Result<Vec<Call>, ExecutionError> {
    let mut reader = CalldataReader::new(calldata);
    let num_calls = felt_to_usize(reader.next_felt()?)?;
    let entries = reader.next_slice(num_calls.saturating_mul(CALL_ARRAY_ENTRY_LEN))?;
    let flattened = reader.next_array()?;
    reader.finish()?;

    entries
        .chunks(CALL_ARRAY_ENTRY_LEN)
        .map(|entry| -> Result<Call, ExecutionError> {
            let offset = felt_to_usize(entry[2])?;
            let len = felt_to_usize(entry[3])?;
            let data = offset
                .checked_add(len)
                .and_then(|end| flattened.get(offset..end))
                .ok_or(AccountError::CallArrayOutOfBounds)?;

            Ok(Call {
                to: entry[0],
                selector: entry[1],
                calldata: data.to_vec(),
            })
        })
        .collect()
}

/// The account class
#[derive(Debug)]
pub struct Account {
    /// The ABI of the account
    abi: ContractAbi,
}

impl Account {
    /// Builds the account class
    pub fn new() -> Self {
        let abi = ContractAbi::new()
            .with_constructor(&[("publicKey", FELT_TYPE)])
            .with_view(GET_PUBLIC_KEY_FN_NAME, &[], &[("publicKey", FELT_TYPE)])
            .with_view(GET_NONCE_FN_NAME, &[], &[("nonce", FELT_TYPE)])
            .with_external(
                EXECUTE_FN_NAME,
                &[
                    ("call_array_len", FELT_TYPE),
                    ("call_array", "AccountCallArray*"),
                    ("calldata_len", FELT_TYPE),
                    ("calldata", FELT_ARRAY_TYPE),
                ],
                &[("response_len", FELT_TYPE), ("response", FELT_ARRAY_TYPE)],
            );

        Self { abi }
    }

    /// The public key of the executing account
    pub fn public_key(ctx: &ExecutionContext) -> Result<FieldElement, ExecutionError> {
        ACCOUNT_PUBLIC_KEY.read(ctx, &[])
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractClass for Account {
    fn name(&self) -> &'static str {
        ACCOUNT_CONTRACT_NAME
    }

    fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    fn constructor(
        &self,
        ctx: &mut ExecutionContext,
        calldata: &[FieldElement],
    ) -> Result<(), ExecutionError> {
        let mut reader = CalldataReader::new(calldata);
        let public_key = reader.next_felt()?;
        reader.finish()?;

        ACCOUNT_PUBLIC_KEY.write(ctx, &[], public_key)
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        selector: FieldElement,
        calldata: &[FieldElement],
    ) -> Result<Vec<FieldElement>, ExecutionError> {
        match self.entry_point_name(selector)? {
            GET_PUBLIC_KEY_FN_NAME => {
                CalldataReader::new(calldata).finish()?;
                Ok(vec![Self::public_key(ctx)?])
            },
            GET_NONCE_FN_NAME => {
                CalldataReader::new(calldata).finish()?;
                Ok(vec![FieldElement::from(ctx.nonce()?)])
            },
            EXECUTE_FN_NAME => {
                if ctx.caller_address() != FieldElement::ZERO {
                    return Err(AccountError::ReentrantCall.into());
                }

                let mut response = Vec::new();
                for call in decode_execute_calldata(calldata)? {
                    response.extend(ctx.call_contract(call.to, call.selector, &call.calldata)?);
                }
                Ok(response.to_calldata())
            },
            _ => Err(ExecutionError::EntryPointNotFound { selector }),
        }
    }
}
