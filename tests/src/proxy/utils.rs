use std::{path::PathBuf, sync::Arc};

use contracts_common::constants::MYSTIS_NFT_CONTRACT_NAME;
use contracts_utils::{
    client::StarknetClient,
    contract::ContractHandle,
    devnet::{account::DevnetAccount, Devnet, DevnetSnapshot},
    signer::{MockSigner, DEFAULT_PRIVATE_KEY},
};
use eyre::Result;
use starknet::core::types::FieldElement;
use starknet_scripts::{
    cli::DEFAULT_ARTIFACTS_PATH,
    commands::utils::{deploy_proxy, proxy_handle, ProxyDeployment, Session},
    config::DeployConfig,
};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::utils::{global_setup, init_tracing, temp_path};

/// The max supply of the collection deployed for the tests
pub const MAX_SUPPLY: u128 = 8000;
/// The private key of the second, non-admin account
pub const USER_PRIVATE_KEY: u64 = 987654321123456789;
/// An arbitrary value to set admin / ownership fields to
pub const VALUE: u64 = 42;

/// The devnet state after the proxy deployment, shared by every test in a binary
struct BaseFixture {
    snapshot: DevnetSnapshot,
    admin_address: FieldElement,
    user_address: FieldElement,
    proxy_address: FieldElement,
    implementation_hash: FieldElement,
}

static BASE_FIXTURE: OnceCell<BaseFixture> = OnceCell::const_new();

/// A private devnet with the proxy deployed & initialized
pub struct ProxyTestContext {
    pub devnet: Devnet,
    /// The account that deployed the proxy, which is the proxy admin & the collection owner
    pub admin: Arc<DevnetAccount>,
    /// An account with no special rights
    pub user: Arc<DevnetAccount>,
    /// The proxy, seen through the V1 implementation's ABI, invoked by the admin
    pub proxy: ContractHandle,
    /// The V1 implementation class hash
    pub implementation_hash: FieldElement,
}

impl ProxyTestContext {
    /// The proxy, invoked by the given account
    pub fn proxy_as(&self, account: &Arc<DevnetAccount>) -> ContractHandle {
        self.proxy.with_client(account.clone())
    }

    /// A script session for the given account, with its own deployments file
    pub fn session(&self, account: &Arc<DevnetAccount>, config: DeployConfig) -> Session {
        script_session(account.clone(), config)
    }
}

/// The deployment parameters used in the tests, with the given collection owner
pub fn test_config(owner: FieldElement) -> DeployConfig {
    DeployConfig {
        owner: format!("{owner:#x}"),
        max_supply: MAX_SUPPLY,
        ..Default::default()
    }
}

/// A script session wrapping a devnet account
pub fn script_session(client: Arc<dyn StarknetClient>, config: DeployConfig) -> Session {
    Session::new(
        client,
        config,
        PathBuf::from(DEFAULT_ARTIFACTS_PATH),
        temp_path("deployments"),
    )
}

async fn build_base_fixture() -> Result<BaseFixture> {
    let devnet = global_setup()?;
    let admin = devnet.deploy_account(&MockSigner::new(FieldElement::from(DEFAULT_PRIVATE_KEY)))?;
    let user = devnet.deploy_account(&MockSigner::new(FieldElement::from(USER_PRIVATE_KEY)))?;

    let session = script_session(Arc::new(admin.clone()), test_config(admin.address()));
    let ProxyDeployment {
        proxy,
        implementation_hash,
        ..
    } = deploy_proxy(&session, None, None).await?;
    debug!("Proxy deployed at {:#x}", proxy.address());

    Ok(BaseFixture {
        snapshot: devnet.snapshot()?,
        admin_address: admin.address(),
        user_address: user.address(),
        proxy_address: proxy.address(),
        implementation_hash,
    })
}

/// Forks a devnet holding the deployed proxy
pub async fn setup_proxy_test() -> Result<ProxyTestContext> {
    init_tracing();
    let base = BASE_FIXTURE.get_or_try_init(build_base_fixture).await?;

    let devnet = Devnet::from_snapshot(base.snapshot.clone())?;
    let admin = Arc::new(DevnetAccount::new(
        devnet.clone(),
        base.admin_address,
        MockSigner::new(FieldElement::from(DEFAULT_PRIVATE_KEY)),
    ));
    let user = Arc::new(DevnetAccount::new(
        devnet.clone(),
        base.user_address,
        MockSigner::new(FieldElement::from(USER_PRIVATE_KEY)),
    ));

    let session = script_session(admin.clone(), test_config(base.admin_address));
    let proxy = proxy_handle(&session, base.proxy_address, MYSTIS_NFT_CONTRACT_NAME).await?;

    Ok(ProxyTestContext {
        devnet,
        admin,
        user,
        proxy,
        implementation_hash: base.implementation_hash,
    })
}
