//! Tests of the NFT collection, reached through the proxy

use contracts_common::{
    calldata::{CalldataReader, CalldataSerializable},
    constants::{
        APPROVE_FN_NAME, BALANCE_OF_FN_NAME, GET_APPROVED_FN_NAME, MAX_SUPPLY_REACHED_MSG,
        MINT_FN_NAME, MYSTIS_PROXY_CONTRACT_NAME, NAME_FN_NAME, NOT_OWNER_MSG, OWNER_FN_NAME,
        OWNER_OF_FN_NAME, OWNERSHIP_TRANSFERRED_EVENT_NAME, SYMBOL_FN_NAME, TOKEN_URI_FN_NAME,
        TRANSFER_EVENT_NAME, TRANSFER_FROM_FN_NAME, TRANSFER_OWNERSHIP_FN_NAME, ZERO_OWNER_MSG,
    },
    encoding::{array_to_long_str, str_to_felt, to_uint},
    types::Uint256,
};
use contracts_utils::{
    assertions::{assert_event_emitted, assert_revert},
    contract::ContractHandle,
};
use eyre::Result;
use starknet::core::types::FieldElement;
use starknet_scripts::commands::utils::{deploy_proxy, total_minted, ProxyDeployment};
use tests::{
    proxy::utils::{setup_proxy_test, test_config, VALUE},
    utils::invoke_contract,
};

/// The URI of the first token under the default configuration
const FIRST_TOKEN_URI: &str =
    "https://gateway.pinata.cloud/ipfs/XXXXXXXXXXXXXXXXXXXXXXXXXXX/1.json";

/// Reads the owner of a token
async fn owner_of(proxy: &ContractHandle, token_id: Uint256) -> Result<FieldElement> {
    let res = proxy.call(OWNER_OF_FN_NAME, token_id.to_calldata()).await?;
    Ok(res[0])
}

/// Reads the balance of an account
async fn balance_of(proxy: &ContractHandle, account: FieldElement) -> Result<Uint256> {
    let res = proxy.call(BALANCE_OF_FN_NAME, vec![account]).await?;
    let mut reader = CalldataReader::new(&res);
    let balance = reader.next_uint256()?;
    reader.finish()?;

    Ok(balance)
}

#[tokio::test]
async fn test_collection_metadata() -> Result<()> {
    let ctx = setup_proxy_test().await?;

    assert_eq!(ctx.proxy.call(NAME_FN_NAME, vec![]).await?, vec![str_to_felt("Mystis")?]);
    assert_eq!(ctx.proxy.call(SYMBOL_FN_NAME, vec![]).await?, vec![str_to_felt("Mystis")?]);
    assert_eq!(ctx.proxy.call(OWNER_FN_NAME, vec![]).await?, vec![ctx.admin.address()]);
    assert_eq!(total_minted(&ctx.proxy).await?, to_uint(0));

    Ok(())
}

#[tokio::test]
async fn test_mint() -> Result<()> {
    let ctx = setup_proxy_test().await?;

    let receipt = invoke_contract(&ctx.admin, ctx.proxy.address(), MINT_FN_NAME, vec![]).await?;
    let [low, high] = to_uint(1).to_felts();
    assert_event_emitted(
        &receipt,
        ctx.proxy.address(),
        TRANSFER_EVENT_NAME,
        &[FieldElement::ZERO, ctx.admin.address(), low, high],
    );

    assert_eq!(total_minted(&ctx.proxy).await?, to_uint(1));
    assert_eq!(owner_of(&ctx.proxy, to_uint(1)).await?, ctx.admin.address());
    assert_eq!(balance_of(&ctx.proxy, ctx.admin.address()).await?, to_uint(1));

    // Anyone can mint, IDs are sequential
    ctx.proxy_as(&ctx.user).invoke(MINT_FN_NAME, vec![]).await?;
    assert_eq!(total_minted(&ctx.proxy).await?, to_uint(2));
    assert_eq!(owner_of(&ctx.proxy, to_uint(2)).await?, ctx.user.address());

    Ok(())
}

#[tokio::test]
async fn test_mint_max_supply() -> Result<()> {
    let ctx = setup_proxy_test().await?;

    // A second collection, reusing the declared classes
    let mut config = test_config(ctx.admin.address());
    config.max_supply = 2;
    config.salt = 1;
    let session = ctx.session(&ctx.admin, config);
    let ProxyDeployment { proxy, .. } = deploy_proxy(
        &session,
        Some(format!("{:#x}", ctx.implementation_hash)),
        Some(format!("{:#x}", ctx.devnet.class_hash(MYSTIS_PROXY_CONTRACT_NAME)?)),
    )
    .await?;
    assert_ne!(proxy.address(), ctx.proxy.address());

    proxy.invoke(MINT_FN_NAME, vec![]).await?;
    proxy.invoke(MINT_FN_NAME, vec![]).await?;
    let result = proxy.invoke(MINT_FN_NAME, vec![]).await;
    assert_revert(result, MAX_SUPPLY_REACHED_MSG);

    assert_eq!(total_minted(&proxy).await?, to_uint(2));
    // The first collection is unaffected
    assert_eq!(total_minted(&ctx.proxy).await?, to_uint(0));

    Ok(())
}

#[tokio::test]
async fn test_token_uri() -> Result<()> {
    let ctx = setup_proxy_test().await?;

    let result = ctx.proxy.call(TOKEN_URI_FN_NAME, to_uint(1).to_calldata()).await;
    assert_revert(result, "MystisNFT: URI query for nonexistent token");

    ctx.proxy.invoke(MINT_FN_NAME, vec![]).await?;
    let res = ctx.proxy.call(TOKEN_URI_FN_NAME, to_uint(1).to_calldata()).await?;
    let mut reader = CalldataReader::new(&res);
    let uri = array_to_long_str(&reader.next_array()?)?;
    reader.finish()?;

    assert_eq!(uri, FIRST_TOKEN_URI);

    Ok(())
}

#[tokio::test]
async fn test_transfer_from() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let token_id = to_uint(1);
    let user_proxy = ctx.proxy_as(&ctx.user);

    ctx.proxy.invoke(MINT_FN_NAME, vec![]).await?;
    let mut transfer_calldata = vec![ctx.admin.address(), ctx.user.address()];
    transfer_calldata.extend(token_id.to_calldata());

    let result = user_proxy
        .invoke(TRANSFER_FROM_FN_NAME, transfer_calldata.clone())
        .await;
    assert_revert(
        result,
        "ERC721: either is not approved or the caller is the zero address",
    );

    let mut approve_calldata = vec![ctx.user.address()];
    approve_calldata.extend(token_id.to_calldata());
    ctx.proxy.invoke(APPROVE_FN_NAME, approve_calldata).await?;
    assert_eq!(
        ctx.proxy.call(GET_APPROVED_FN_NAME, token_id.to_calldata()).await?,
        vec![ctx.user.address()]
    );

    user_proxy.invoke(TRANSFER_FROM_FN_NAME, transfer_calldata).await?;
    assert_eq!(owner_of(&ctx.proxy, token_id).await?, ctx.user.address());
    assert_eq!(balance_of(&ctx.proxy, ctx.admin.address()).await?, to_uint(0));
    assert_eq!(balance_of(&ctx.proxy, ctx.user.address()).await?, to_uint(1));

    // The approval is cleared by the transfer
    assert_eq!(
        ctx.proxy.call(GET_APPROVED_FN_NAME, token_id.to_calldata()).await?,
        vec![FieldElement::ZERO]
    );

    Ok(())
}

#[tokio::test]
async fn test_transfer_ownership() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let new_owner = FieldElement::from(VALUE);

    let result = ctx
        .proxy_as(&ctx.user)
        .invoke(TRANSFER_OWNERSHIP_FN_NAME, vec![ctx.user.address()])
        .await;
    assert_revert(result, NOT_OWNER_MSG);

    let result = ctx
        .proxy
        .invoke(TRANSFER_OWNERSHIP_FN_NAME, vec![FieldElement::ZERO])
        .await;
    assert_revert(result, ZERO_OWNER_MSG);

    let receipt = invoke_contract(
        &ctx.admin,
        ctx.proxy.address(),
        TRANSFER_OWNERSHIP_FN_NAME,
        vec![new_owner],
    )
    .await?;
    assert_event_emitted(
        &receipt,
        ctx.proxy.address(),
        OWNERSHIP_TRANSFERRED_EVENT_NAME,
        &[ctx.admin.address(), new_owner],
    );
    assert_eq!(ctx.proxy.call(OWNER_FN_NAME, vec![]).await?, vec![new_owner]);

    Ok(())
}
