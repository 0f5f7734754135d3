//! The Mystis proxy contract.
//!
//! The proxy only knows the hash of its implementation class: every selector other than
//! `getImplementationHash` falls back to `__default__`, which library-calls the implementation
//! in the proxy's storage context. The constructor sets the implementation & runs its
//! initializer the same way.

use contracts_common::{
    abi::{ContractAbi, FELT_ARRAY_TYPE, FELT_TYPE},
    calldata::CalldataReader,
    constants::{
        ADMIN_CHANGED_EVENT_NAME, DEFAULT_FN_NAME, GET_IMPLEMENTATION_HASH_FN_NAME,
        MYSTIS_PROXY_CONTRACT_NAME, UPGRADED_EVENT_NAME,
    },
};
use starknet::core::types::FieldElement;

use crate::{errors::ExecutionError, execution::ExecutionContext};

use super::{components::proxy::Proxy, ContractClass};

/// The Mystis proxy class
#[derive(Debug)]
pub struct MystisProxy {
    /// The ABI of the proxy
    abi: ContractAbi,
}

impl MystisProxy {
    /// Builds the proxy class
    pub fn new() -> Self {
        let abi = ContractAbi::new()
            .with_event(
                ADMIN_CHANGED_EVENT_NAME,
                &[("previousAdmin", FELT_TYPE), ("newAdmin", FELT_TYPE)],
            )
            .with_event(UPGRADED_EVENT_NAME, &[("implementation", FELT_TYPE)])
            .with_constructor(&[
                ("implementation_hash", FELT_TYPE),
                ("selector", FELT_TYPE),
                ("calldata_len", FELT_TYPE),
                ("calldata", FELT_ARRAY_TYPE),
            ])
            .with_view(
                GET_IMPLEMENTATION_HASH_FN_NAME,
                &[],
                &[("implementation", FELT_TYPE)],
            )
            .with_external(
                DEFAULT_FN_NAME,
                &[
                    ("selector", FELT_TYPE),
                    ("calldata_size", FELT_TYPE),
                    ("calldata", FELT_ARRAY_TYPE),
                ],
                &[("retdata_size", FELT_TYPE), ("retdata", FELT_ARRAY_TYPE)],
            );

        Self { abi }
    }
}

impl Default for MystisProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractClass for MystisProxy {
    fn name(&self) -> &'static str {
        MYSTIS_PROXY_CONTRACT_NAME
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
        let implementation_hash = reader.next_felt()?;
        let selector = reader.next_felt()?;
        let initializer_calldata = reader.next_array()?;
        reader.finish()?;

        if !ctx.is_declared(implementation_hash) {
            return Err(ExecutionError::ClassNotDeclared {
                class_hash: implementation_hash,
            });
        }
        Proxy::_set_implementation_hash(ctx, implementation_hash)?;

        if selector != FieldElement::ZERO {
            ctx.library_call(implementation_hash, selector, &initializer_calldata)?;
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        selector: FieldElement,
        calldata: &[FieldElement],
    ) -> Result<Vec<FieldElement>, ExecutionError> {
        match self.entry_point_name(selector) {
            Ok(GET_IMPLEMENTATION_HASH_FN_NAME) => {
                CalldataReader::new(calldata).finish()?;
                Ok(vec![Proxy::get_implementation_hash(ctx)?])
            },
            // __default__
            _ => {
                let implementation_hash = Proxy::get_implementation_hash(ctx)?;
                ctx.library_call(implementation_hash, selector, calldata)
            },
        }
    }
}
