//! Script to check a deployed proxy

use contracts_common::constants::MYSTIS_NFT_CONTRACT_NAME;
use eyre::Result;

use crate::{
    cli::VerifyArgs,
    commands::utils::{proxy_handle, resolve_address, verify_proxy, Session, PROXY_KEY},
};

/// Checks the proxy admin, then mints a token through the proxy
pub async fn verify(args: VerifyArgs, session: &Session) -> Result<()> {
    let VerifyArgs {
        proxy_address,
        skip_mint,
    } = args;

    let proxy_address = resolve_address(session, proxy_address.as_deref(), PROXY_KEY)?;
    let proxy = proxy_handle(session, proxy_address, MYSTIS_NFT_CONTRACT_NAME).await?;

    verify_proxy(session, &proxy, !skip_mint).await
}
