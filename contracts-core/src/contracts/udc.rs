//! The universal deployer contract, through which accounts deploy contract instances

use contracts_common::{
    abi::{ContractAbi, FELT_ARRAY_TYPE, FELT_TYPE},
    calldata::CalldataReader,
    constants::{CONTRACT_DEPLOYED_EVENT_NAME, DEPLOY_CONTRACT_FN_NAME, UDC_CONTRACT_NAME},
};
use starknet::core::{
    crypto::pedersen_hash,
    types::FieldElement,
    utils::get_contract_address,
};

use crate::{errors::ExecutionError, execution::ExecutionContext};

use super::ContractClass;

/// The salt & deployer address a deployment's address is derived from.
///
/// Unique deployments hash the salt with the deploying account, so that two accounts using
/// the same salt get distinct addresses, and are deployed from the universal deployer's
/// address. Other deployments are deployed from the zero address.
fn deployment_salt(
    udc_address: FieldElement,
    deployer: FieldElement,
    salt: FieldElement,
    unique: bool,
) -> (FieldElement, FieldElement) {
    if unique {
        (pedersen_hash(&deployer, &salt), udc_address)
    } else {
        (salt, FieldElement::ZERO)
    }
}

/// The address a deployment through the universal deployer lands at
pub fn udc_deployment_address(
    udc_address: FieldElement,
    deployer: FieldElement,
    class_hash: FieldElement,
    salt: FieldElement,
    unique: bool,
    constructor_calldata: &[FieldElement],
) -> FieldElement {
    let (salt, deployer_address) = deployment_salt(udc_address, deployer, salt, unique);
    get_contract_address(salt, class_hash, constructor_calldata, deployer_address)
}

/// The universal deployer class
#[derive(Debug)]
pub struct UniversalDeployer {
    /// The ABI of the deployer
    abi: ContractAbi,
}

impl UniversalDeployer {
    /// Builds the deployer class
    pub fn new() -> Self {
        let abi = ContractAbi::new()
            .with_event(
                CONTRACT_DEPLOYED_EVENT_NAME,
                &[
                    ("address", FELT_TYPE),
                    ("deployer", FELT_TYPE),
                    ("unique", FELT_TYPE),
                    ("classHash", FELT_TYPE),
                    ("calldata_len", FELT_TYPE),
                    ("calldata", FELT_ARRAY_TYPE),
                    ("salt", FELT_TYPE),
                ],
            )
            .with_external(
                DEPLOY_CONTRACT_FN_NAME,
                &[
                    ("classHash", FELT_TYPE),
                    ("salt", FELT_TYPE),
                    ("unique", FELT_TYPE),
                    ("calldata_len", FELT_TYPE),
                    ("calldata", FELT_ARRAY_TYPE),
                ],
                &[("address", FELT_TYPE)],
            );

        Self { abi }
    }
}

impl Default for UniversalDeployer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractClass for UniversalDeployer {
    fn name(&self) -> &'static str {
        UDC_CONTRACT_NAME
    }

    fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        selector: FieldElement,
        calldata: &[FieldElement],
    ) -> Result<Vec<FieldElement>, ExecutionError> {
        if self.entry_point_name(selector)? != DEPLOY_CONTRACT_FN_NAME {
            return Err(ExecutionError::EntryPointNotFound { selector });
        }

        let mut reader = CalldataReader::new(calldata);
        let class_hash = reader.next_felt()?;
        let salt = reader.next_felt()?;
        let unique = reader.next_felt()? != FieldElement::ZERO;
        let constructor_calldata = reader.next_array()?;
        reader.finish()?;

        let deployer = ctx.caller_address();
        let (deployment_salt, deployer_address) =
            deployment_salt(ctx.contract_address(), deployer, salt, unique);
        let address =
            ctx.deploy(class_hash, deployment_salt, &constructor_calldata, deployer_address)?;

        let mut data = vec![
            address,
            deployer,
            FieldElement::from(unique as u8),
            class_hash,
            FieldElement::from(constructor_calldata.len()),
        ];
        data.extend(constructor_calldata);
        data.push(salt);
        ctx.emit_event(CONTRACT_DEPLOYED_EVENT_NAME, data);

        Ok(vec![address])
    }
}
