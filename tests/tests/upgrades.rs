//! Tests of upgrading the proxy to a new implementation

use contracts_common::{
    calldata::CalldataSerializable,
    constants::{
        BALANCE_OF_FN_NAME, BURN_FN_NAME, GET_ADMIN_FN_NAME, GET_IMPLEMENTATION_HASH_FN_NAME,
        MAX_SUPPLY_FN_NAME, MINT_FN_NAME, MYSTIS_NFT_V2_CONTRACT_NAME, NAME_FN_NAME,
        NOT_ADMIN_MSG, OWNER_FN_NAME, UPGRADED_EVENT_NAME, UPGRADE_FN_NAME, VERSION_FN_NAME,
        ZERO_IMPLEMENTATION_MSG,
    },
    encoding::{selector, str_to_felt, to_uint},
};
use contracts_utils::assertions::{assert_event_emitted, assert_revert, assert_revert_entry_point};
use eyre::Result;
use starknet::core::types::FieldElement;
use starknet_scripts::commands::utils::{get_or_declare, total_minted, upgrade_proxy};
use tests::{
    proxy::utils::{setup_proxy_test, test_config, MAX_SUPPLY},
    utils::{call_contract, invoke_contract},
};

#[tokio::test]
async fn test_upgrade_preserves_state() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let session = ctx.session(&ctx.admin, test_config(ctx.admin.address()));

    ctx.proxy.invoke(MINT_FN_NAME, vec![]).await?;
    assert_eq!(ctx.proxy.call(VERSION_FN_NAME, vec![]).await?, vec![FieldElement::ONE]);

    let proxy = upgrade_proxy(&session, &ctx.proxy, MYSTIS_NFT_V2_CONTRACT_NAME, None).await?;

    // Same address, new logic
    assert_eq!(proxy.address(), ctx.proxy.address());
    assert_eq!(proxy.call(VERSION_FN_NAME, vec![]).await?, vec![FieldElement::from(2_u8)]);
    let implementation_hash = call_contract(
        &ctx.admin,
        proxy.address(),
        GET_IMPLEMENTATION_HASH_FN_NAME,
        vec![],
    )
    .await?;
    assert_eq!(
        implementation_hash,
        vec![ctx.devnet.class_hash(MYSTIS_NFT_V2_CONTRACT_NAME)?]
    );

    // Storage written through V1 is read through V2
    assert_eq!(total_minted(&proxy).await?, to_uint(1));
    assert_eq!(proxy.call(GET_ADMIN_FN_NAME, vec![]).await?, vec![ctx.admin.address()]);
    assert_eq!(proxy.call(OWNER_FN_NAME, vec![]).await?, vec![ctx.admin.address()]);
    assert_eq!(proxy.call(NAME_FN_NAME, vec![]).await?, vec![str_to_felt("Mystis")?]);
    assert_eq!(
        proxy.call(MAX_SUPPLY_FN_NAME, vec![]).await?,
        to_uint(MAX_SUPPLY).to_calldata()
    );

    Ok(())
}

#[tokio::test]
async fn test_upgrade_exposes_new_entry_points() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let session = ctx.session(&ctx.admin, test_config(ctx.admin.address()));
    let token_id = to_uint(1);

    ctx.proxy.invoke(MINT_FN_NAME, vec![]).await?;

    // `burn` only exists in V2
    let result = invoke_contract(
        &ctx.admin,
        ctx.proxy.address(),
        BURN_FN_NAME,
        token_id.to_calldata(),
    )
    .await;
    assert_revert_entry_point(result, selector(BURN_FN_NAME)?);

    let proxy = upgrade_proxy(&session, &ctx.proxy, MYSTIS_NFT_V2_CONTRACT_NAME, None).await?;
    proxy.invoke(BURN_FN_NAME, token_id.to_calldata()).await?;

    let balance = proxy
        .call(BALANCE_OF_FN_NAME, vec![ctx.admin.address()])
        .await?;
    assert_eq!(balance, to_uint(0).to_calldata());
    // Burning does not give the token ID back
    assert_eq!(total_minted(&proxy).await?, to_uint(1));

    Ok(())
}

#[tokio::test]
async fn test_upgrade_emits_event() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let session = ctx.session(&ctx.admin, test_config(ctx.admin.address()));

    let class_hash = get_or_declare(&session, MYSTIS_NFT_V2_CONTRACT_NAME, None).await?;
    let receipt = invoke_contract(
        &ctx.admin,
        ctx.proxy.address(),
        UPGRADE_FN_NAME,
        vec![class_hash],
    )
    .await?;

    assert!(receipt.is_accepted());
    assert_event_emitted(&receipt, ctx.proxy.address(), UPGRADED_EVENT_NAME, &[class_hash]);

    Ok(())
}

#[tokio::test]
async fn test_upgrade_non_admin() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let session = ctx.session(&ctx.admin, test_config(ctx.admin.address()));

    let class_hash = get_or_declare(&session, MYSTIS_NFT_V2_CONTRACT_NAME, None).await?;
    let result = ctx
        .proxy_as(&ctx.user)
        .invoke(UPGRADE_FN_NAME, vec![class_hash])
        .await;
    assert_revert(result, NOT_ADMIN_MSG);

    assert_eq!(ctx.proxy.call(VERSION_FN_NAME, vec![]).await?, vec![FieldElement::ONE]);

    Ok(())
}

#[tokio::test]
async fn test_upgrade_zero_class_hash() -> Result<()> {
    let ctx = setup_proxy_test().await?;

    let result = ctx
        .proxy
        .invoke(UPGRADE_FN_NAME, vec![FieldElement::ZERO])
        .await;
    assert_revert(result, ZERO_IMPLEMENTATION_MSG);

    Ok(())
}
