//! Tests of the proxy's admin & initialization logic

use contracts_common::{
    calldata::CalldataSerializable,
    constants::{
        ADMIN_CHANGED_EVENT_NAME, ALREADY_INITIALIZED_MSG, GET_ADMIN_FN_NAME,
        GET_IMPLEMENTATION_HASH_FN_NAME, INITIALIZER_FN_NAME, NOT_ADMIN_MSG, SET_ADMIN_FN_NAME,
        ZERO_ADMIN_MSG,
    },
    encoding::str_to_felt,
    types::InitializerArgs,
};
use contracts_utils::assertions::{
    assert_revert, assert_revert_entry_point, count_events,
};
use eyre::Result;
use starknet::core::types::FieldElement;
use tests::{
    proxy::utils::{setup_proxy_test, VALUE},
    utils::{call_contract, invoke_contract, invoke_selector, random_felt},
};

#[tokio::test]
async fn test_initialization_sets_admin() -> Result<()> {
    let ctx = setup_proxy_test().await?;

    let admin = ctx.proxy.call(GET_ADMIN_FN_NAME, vec![]).await?;
    assert_eq!(admin, vec![ctx.admin.address()]);

    // The proxy points at the V1 implementation
    let implementation_hash = call_contract(
        &ctx.admin,
        ctx.proxy.address(),
        GET_IMPLEMENTATION_HASH_FN_NAME,
        vec![],
    )
    .await?;
    assert_eq!(implementation_hash, vec![ctx.implementation_hash]);

    Ok(())
}

#[tokio::test]
async fn test_initializer_runs_once() -> Result<()> {
    let ctx = setup_proxy_test().await?;

    let args = InitializerArgs {
        name: str_to_felt("Other")?,
        symbol: str_to_felt("OTH")?,
        owner: ctx.user.address(),
        token_uri: vec![random_felt()],
        token_uri_suffix: str_to_felt(".json")?,
        max_supply: 1_u128.into(),
        proxy_admin: ctx.user.address(),
    };

    let result = invoke_contract(
        &ctx.user,
        ctx.proxy.address(),
        INITIALIZER_FN_NAME,
        args.to_calldata(),
    )
    .await;
    assert_revert(result, ALREADY_INITIALIZED_MSG);

    // The admin is untouched
    let admin = ctx.proxy.call(GET_ADMIN_FN_NAME, vec![]).await?;
    assert_eq!(admin, vec![ctx.admin.address()]);

    Ok(())
}

#[tokio::test]
async fn test_set_admin_non_admin() -> Result<()> {
    let ctx = setup_proxy_test().await?;

    let result = ctx
        .proxy_as(&ctx.user)
        .invoke(SET_ADMIN_FN_NAME, vec![ctx.user.address()])
        .await;
    assert_revert(result, NOT_ADMIN_MSG);

    let admin = ctx.proxy.call(GET_ADMIN_FN_NAME, vec![]).await?;
    assert_eq!(admin, vec![ctx.admin.address()]);

    Ok(())
}

#[tokio::test]
async fn test_set_admin() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let new_admin = FieldElement::from(VALUE);

    let receipt = invoke_contract(
        &ctx.admin,
        ctx.proxy.address(),
        SET_ADMIN_FN_NAME,
        vec![new_admin],
    )
    .await?;

    // Events are emitted from the proxy's address
    assert_eq!(
        count_events(
            &receipt,
            ctx.proxy.address(),
            ADMIN_CHANGED_EVENT_NAME,
            &[ctx.admin.address(), new_admin],
        ),
        1
    );

    let admin = ctx.proxy.call(GET_ADMIN_FN_NAME, vec![]).await?;
    assert_eq!(admin, vec![new_admin]);

    // The previous admin lost its rights
    let result = ctx
        .proxy
        .invoke(SET_ADMIN_FN_NAME, vec![ctx.admin.address()])
        .await;
    assert_revert(result, NOT_ADMIN_MSG);

    Ok(())
}

#[tokio::test]
async fn test_set_admin_zero() -> Result<()> {
    let ctx = setup_proxy_test().await?;

    let result = ctx
        .proxy
        .invoke(SET_ADMIN_FN_NAME, vec![FieldElement::ZERO])
        .await;
    assert_revert(result, ZERO_ADMIN_MSG);

    Ok(())
}

#[tokio::test]
async fn test_unknown_selector_is_rejected() -> Result<()> {
    let ctx = setup_proxy_test().await?;
    let selector = random_felt();

    let result = invoke_selector(&ctx.admin, ctx.proxy.address(), selector, vec![]).await;
    assert_revert_entry_point(result, selector);

    Ok(())
}
