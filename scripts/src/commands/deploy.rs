//! Script to deploy the proxy, initializing the NFT implementation behind it

use contracts_utils::contract::ContractHandle;
use eyre::Result;
use tracing::info;

use crate::{
    cli::DeployArgs,
    commands::utils::{deploy_proxy, ProxyDeployment, Session},
};

/// Declares the implementation & proxy classes, then deploys the proxy.
/// Returns the proxy bound to the implementation's ABI.
pub async fn deploy_and_initialize(args: DeployArgs, session: &Session) -> Result<ContractHandle> {
    let DeployArgs {
        nft_class_hash,
        proxy_class_hash,
    } = args;

    let ProxyDeployment {
        proxy,
        implementation_hash,
        proxy_hash,
        transaction_hash,
    } = deploy_proxy(session, nft_class_hash, proxy_class_hash).await?;

    info!(
        "Proxy contract successfully deployed & initialized!\n\
        Proxy contract address: {:#64x}\n\
        Proxy class hash: {:#64x}\n\
        Implementation class hash: {:#64x}\n\
        Proxy admin: {:#64x}\n\
        Transaction hash: {:#64x}\n",
        proxy.address(),
        proxy_hash,
        implementation_hash,
        session.client.address(),
        transaction_hash,
    );

    Ok(proxy)
}
