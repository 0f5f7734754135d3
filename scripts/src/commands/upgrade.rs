//! Script to upgrade the implementation behind the proxy

use contracts_common::constants::{MYSTIS_NFT_CONTRACT_NAME, VERSION_FN_NAME};
use eyre::Result;
use tracing::info;

use crate::{
    cli::UpgradeArgs,
    commands::utils::{proxy_handle, resolve_address, upgrade_proxy, Session, PROXY_KEY},
};

/// Declares the new implementation & points the proxy at it
pub async fn upgrade(args: UpgradeArgs, session: &Session) -> Result<()> {
    let UpgradeArgs {
        proxy_address,
        contract,
        class_hash,
    } = args;

    let proxy_address = resolve_address(session, proxy_address.as_deref(), PROXY_KEY)?;
    let proxy = proxy_handle(session, proxy_address, MYSTIS_NFT_CONTRACT_NAME).await?;

    let proxy = upgrade_proxy(session, &proxy, contract.name(), class_hash).await?;
    let version = proxy.call(VERSION_FN_NAME, vec![]).await?;

    info!(
        "Successfully upgraded proxy {:#64x} to {}, now at version {}.",
        proxy.address(),
        contract.name(),
        version.first().copied().unwrap_or_default(),
    );

    Ok(())
}
