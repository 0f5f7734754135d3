use std::{env, path::PathBuf, sync::Once};

use contracts_common::{encoding::selector, types::Call};
use contracts_utils::{
    client::StarknetClient,
    devnet::{account::DevnetAccount, transaction::TxReceipt, Devnet},
    errors::ClientError,
};
use eyre::{eyre, Result};
use rand::{thread_rng, Rng};
use starknet::{core::types::FieldElement, signers::SigningKey};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

// ---------------------
// | META TEST HELPERS |
// ---------------------

static TRACING_INIT: Once = Once::new();

/// Installs the test log subscriber, once per test binary
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    });
}

/// Starts a fresh devnet
pub fn global_setup() -> Result<Devnet> {
    init_tracing();

    debug!("Starting devnet...");
    Ok(Devnet::new()?)
}

/// A random, non-zero field element
pub fn random_felt() -> FieldElement {
    SigningKey::from_random().secret_scalar()
}

/// A path in the temp directory no other test uses
pub fn temp_path(prefix: &str) -> PathBuf {
    env::temp_dir().join(format!("{prefix}-{}.json", thread_rng().gen::<u64>()))
}

// --------------------------------
// | CONTRACT INTERACTION HELPERS |
// --------------------------------

pub async fn call_contract(
    account: &DevnetAccount,
    contract_address: FieldElement,
    entry_point: &str,
    calldata: Vec<FieldElement>,
) -> Result<Vec<FieldElement>> {
    debug!("Calling {} on contract...", entry_point);
    account
        .call(Call {
            to: contract_address,
            selector: selector(entry_point)?,
            calldata,
        })
        .await
        .map_err(|e| eyre!("Error calling {}: {}", entry_point, e))
}

/// Invokes an entry point, returning the receipt of the accepted transaction.
///
/// The raw client error is returned so that reverts can be asserted on.
pub async fn invoke_contract(
    account: &DevnetAccount,
    contract_address: FieldElement,
    entry_point: &str,
    calldata: Vec<FieldElement>,
) -> Result<TxReceipt, ClientError> {
    debug!("Invoking {} on contract...", entry_point);
    invoke_selector(account, contract_address, selector(entry_point)?, calldata).await
}

/// Invokes a raw selector, which need not be exposed by the contract
pub async fn invoke_selector(
    account: &DevnetAccount,
    contract_address: FieldElement,
    entry_point_selector: FieldElement,
    calldata: Vec<FieldElement>,
) -> Result<TxReceipt, ClientError> {
    let transaction_hash = account
        .execute(
            vec![Call {
                to: contract_address,
                selector: entry_point_selector,
                calldata,
            }],
            None, /* max_fee */
        )
        .await?;

    account.devnet().receipt(transaction_hash)
}
