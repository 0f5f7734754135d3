//! End-to-end tests of the deploy scripts & of the devnet they run on

use std::{ffi::OsString, path::Path};

use clap::Parser;
use contracts_common::{
    abi::ContractAbi,
    calldata::CalldataSerializable,
    constants::{
        GET_ADMIN_FN_NAME, MINT_FN_NAME, MYSTIS_NFT_CONTRACT_NAME, MYSTIS_NFT_V2_CONTRACT_NAME,
        MYSTIS_PROXY_CONTRACT_NAME, NOT_ADMIN_MSG, SET_ADMIN_FN_NAME, TOTAL_MINTED_FN_NAME,
        VERSION_FN_NAME,
    },
    encoding::{selector, to_uint},
    types::Call,
};
use contracts_utils::{
    assertions::assert_revert, devnet::transaction::TxStatus, devnet::Devnet,
    errors::ClientError,
};
use eyre::Result;
use starknet::core::types::FieldElement;
use starknet_scripts::{
    cli::CliArgs,
    commands::utils::{class_hash_key, read_deployment, ACCOUNT_KEY, PROXY_KEY},
};
use tests::{
    proxy::utils::setup_proxy_test,
    utils::{init_tracing, temp_path},
};

/// Runs the scripts on a devnet persisted to `state`
async fn run_cli(args: &[&str], state: &Path, deployments: &Path) -> Result<()> {
    init_tracing();

    let mut argv: Vec<OsString> = vec!["starknet-scripts".into()];
    argv.extend(args.iter().map(OsString::from));
    argv.extend([
        "--devnet-state".into(),
        state.as_os_str().to_owned(),
        "--deployments-path".into(),
        deployments.as_os_str().to_owned(),
    ]);

    let cli = CliArgs::try_parse_from(argv)?;
    cli.command.run(cli.session).await
}

/// Calls a view function on a devnet loaded from disk
fn view(devnet: &Devnet, to: FieldElement, entry_point: &str) -> Result<Vec<FieldElement>> {
    Ok(devnet.call(&Call {
        to,
        selector: selector(entry_point)?,
        calldata: vec![],
    })?)
}

#[tokio::test]
async fn test_run_then_upgrade() -> Result<()> {
    let state = temp_path("devnet-state");
    let deployments = temp_path("deployments");

    run_cli(&["run"], &state, &deployments).await?;

    let devnet = Devnet::load(&state)?;
    let account = read_deployment(&deployments, ACCOUNT_KEY)?;
    let proxy = read_deployment(&deployments, PROXY_KEY)?;
    for name in [MYSTIS_NFT_CONTRACT_NAME, MYSTIS_PROXY_CONTRACT_NAME] {
        let class_hash = read_deployment(&deployments, &class_hash_key(name))?;
        assert_eq!(class_hash, devnet.class_hash(name)?);
        assert!(devnet.is_declared(class_hash)?);
    }
    assert_eq!(
        devnet.class_hash_at(proxy)?,
        devnet.class_hash(MYSTIS_PROXY_CONTRACT_NAME)?
    );
    assert_eq!(view(&devnet, proxy, GET_ADMIN_FN_NAME)?, vec![account]);
    assert_eq!(view(&devnet, proxy, TOTAL_MINTED_FN_NAME)?, to_uint(1).to_calldata());

    // A second invocation reuses the persisted account & proxy
    run_cli(&["upgrade"], &state, &deployments).await?;
    run_cli(&["verify"], &state, &deployments).await?;

    let devnet = Devnet::load(&state)?;
    assert_eq!(read_deployment(&deployments, ACCOUNT_KEY)?, account);
    assert_eq!(
        read_deployment(&deployments, &class_hash_key(MYSTIS_NFT_V2_CONTRACT_NAME))?,
        devnet.class_hash(MYSTIS_NFT_V2_CONTRACT_NAME)?
    );
    assert_eq!(view(&devnet, proxy, VERSION_FN_NAME)?, vec![FieldElement::from(2_u8)]);
    assert_eq!(view(&devnet, proxy, GET_ADMIN_FN_NAME)?, vec![account]);
    assert_eq!(view(&devnet, proxy, TOTAL_MINTED_FN_NAME)?, to_uint(2).to_calldata());

    Ok(())
}

#[tokio::test]
async fn test_verify_without_proxy_fails() -> Result<()> {
    let state = temp_path("devnet-state");
    let deployments = temp_path("deployments");

    // Nothing was deployed, so there is no proxy to read from the deployments file
    let result = run_cli(&["verify", "--skip-mint"], &state, &deployments).await;
    assert!(result.is_err());

    Ok(())
}

#[tokio::test]
async fn test_dump_abi() -> Result<()> {
    let artifacts = temp_path("artifacts");
    let artifacts_arg = artifacts.to_string_lossy().into_owned();

    run_cli(
        &["dump-abi", "--contract", "mystis-nft-v2", "--artifacts-path", &artifacts_arg],
        &temp_path("devnet-state"),
        &temp_path("deployments"),
    )
    .await?;

    let abi = ContractAbi::from_file(
        artifacts
            .join("abis")
            .join(format!("{MYSTIS_NFT_V2_CONTRACT_NAME}.json")),
    )?;
    assert!(abi.function(MINT_FN_NAME).is_some());
    assert!(abi.function(VERSION_FN_NAME).is_some());

    Ok(())
}

#[tokio::test]
async fn test_reverted_transaction_is_recorded() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let nonce = ctx.user.nonce()?;
    let block_number = ctx.devnet.block_number()?;

    let result = ctx
        .proxy_as(&ctx.user)
        .invoke(SET_ADMIN_FN_NAME, vec![ctx.user.address()])
        .await;
    let transaction_hash = match &result {
        Err(ClientError::Reverted {
            transaction_hash, ..
        }) => *transaction_hash,
        other => panic!("expected a reverted transaction, got {other:?}"),
    };
    assert_revert(result, NOT_ADMIN_MSG);

    let receipt = ctx.devnet.receipt(transaction_hash)?;
    assert_eq!(receipt.status, TxStatus::Reverted);
    assert!(receipt.events.is_empty());
    assert_eq!(receipt.revert_reason.as_deref(), Some(NOT_ADMIN_MSG));
    assert_eq!(receipt.block_number, block_number + 1);

    // None of the transaction's changes were kept
    assert_eq!(ctx.user.nonce()?, nonce);
    let admin = ctx.proxy.call(GET_ADMIN_FN_NAME, vec![]).await?;
    assert_eq!(admin, vec![ctx.admin.address()]);

    Ok(())
}

#[tokio::test]
async fn test_forks_are_isolated() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let fork = ctx.devnet.fork()?;
    let snapshot = ctx.devnet.snapshot()?;

    ctx.proxy.invoke(MINT_FN_NAME, vec![]).await?;

    let total = view(&ctx.devnet, ctx.proxy.address(), TOTAL_MINTED_FN_NAME)?;
    assert_eq!(total, to_uint(1).to_calldata());
    let total = view(&fork, ctx.proxy.address(), TOTAL_MINTED_FN_NAME)?;
    assert_eq!(total, to_uint(0).to_calldata());

    // Restoring rolls the mint back
    ctx.devnet.restore(&snapshot)?;
    let total = view(&ctx.devnet, ctx.proxy.address(), TOTAL_MINTED_FN_NAME)?;
    assert_eq!(total, to_uint(0).to_calldata());

    Ok(())
}
