//! Script to declare a single contract class

use eyre::Result;
use tracing::info;

use crate::{
    cli::DeclareArgs,
    commands::utils::{get_or_declare, Session},
};

/// Declares the contract & records its class hash
pub async fn declare(args: DeclareArgs, session: &Session) -> Result<()> {
    let DeclareArgs { contract } = args;

    let class_hash = get_or_declare(session, contract.name(), None).await?;
    info!(
        "{} contract successfully declared!\n\
        Class hash: {:#64x}\n",
        contract.name(),
        class_hash,
    );

    Ok(())
}
