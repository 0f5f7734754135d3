//! Helpers shared by the scripts: session setup, the deployments file,
//! and the declare / deploy / upgrade / verify steps themselves

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use contracts_common::{
    calldata::{CalldataReader, CalldataSerializable},
    constants::{
        GET_ADMIN_FN_NAME, INITIALIZER_FN_NAME, MINT_FN_NAME, MYSTIS_NFT_CONTRACT_NAME,
        MYSTIS_PROXY_CONTRACT_NAME, TOTAL_MINTED_FN_NAME, UPGRADE_FN_NAME,
    },
    encoding::{hex_to_felt, selector},
    types::{ProxyConstructorArgs, Uint256},
};
use contracts_utils::{
    client::{ContractSource, DeclareResult, DeployResult, StarknetClient},
    contract::ContractHandle,
    devnet::{account::DevnetAccount, Devnet},
    rpc::RpcAccount,
    signer::{MockSigner, DEFAULT_PRIVATE_KEY},
};
use eyre::{eyre, Result};
use serde_json::{json, Value};
use starknet::core::{chain_id, types::FieldElement};
use tracing::{debug, info, trace};
use url::Url;

use crate::{
    cli::{Network, SessionArgs},
    config::DeployConfig,
};

/// URL at which a local node is expected to be running
pub const DEVNET_HOST: &str = "http://localhost:5050";

/// The top-level key of the deployments file
pub const DEPLOYMENTS_KEY: &str = "deployments";
/// The deployments file key of the session account
pub const ACCOUNT_KEY: &str = "account";
/// The deployments file key of the proxy
pub const PROXY_KEY: &str = "proxy";

/// The deployments file key of a class hash
pub fn class_hash_key(contract_name: &str) -> String {
    format!("{contract_name}_class_hash")
}

// -----------
// | SESSION |
// -----------

/// A signer-bound connection to a network, plus everything the scripts are configured with
pub struct Session {
    /// The client transactions are sent through
    pub client: Arc<dyn StarknetClient>,
    /// The deployment parameters
    pub config: DeployConfig,
    /// The directory holding compiled contracts & their ABIs
    pub artifacts_path: PathBuf,
    /// The file deployed addresses & class hashes are recorded in
    pub deployments_path: PathBuf,
    /// The in-process devnet, if used, and the file its state is persisted to
    devnet: Option<(Devnet, Option<PathBuf>)>,
}

impl Session {
    /// Sets up a session from the command line arguments
    pub fn setup(args: &SessionArgs) -> Result<Self> {
        let config = DeployConfig::load(args.config.as_deref())?;
        let private_key = match &args.private_key {
            Some(key) => hex_to_felt(key)?,
            None => FieldElement::from(DEFAULT_PRIVATE_KEY),
        };

        let (client, devnet) = match args.network {
            Network::Devnet => {
                let devnet = match &args.devnet_state {
                    Some(path) => Devnet::load_or_new(path)?,
                    None => Devnet::new()?,
                };
                let account = setup_devnet_account(
                    &devnet,
                    args.address.as_deref(),
                    private_key,
                    &args.deployments_path,
                )?;
                (
                    Arc::new(account) as Arc<dyn StarknetClient>,
                    Some((devnet, args.devnet_state.clone())),
                )
            },
            network => {
                let address = args
                    .address
                    .as_deref()
                    .ok_or_else(|| eyre!("An account address is required on {network:?}"))?;
                let account = RpcAccount::new(
                    rpc_url(network, args.rpc_url.as_deref())?,
                    hex_to_felt(address)?,
                    private_key,
                    network_chain_id(network),
                )
                .with_polling(config.poll_interval(), config.max_poll_attempts);
                (Arc::new(account) as Arc<dyn StarknetClient>, None)
            },
        };

        Ok(Self {
            client,
            config,
            artifacts_path: args.artifacts_path.clone(),
            deployments_path: args.deployments_path.clone(),
            devnet,
        })
    }

    /// Wraps an existing client, e.g. a devnet account set up by a test
    pub fn new(
        client: Arc<dyn StarknetClient>,
        config: DeployConfig,
        artifacts_path: PathBuf,
        deployments_path: PathBuf,
    ) -> Self {
        Self {
            client,
            config,
            artifacts_path,
            deployments_path,
            devnet: None,
        }
    }

    /// The artifacts of the given contract
    pub fn source(&self, contract_name: &str) -> ContractSource {
        ContractSource::new(contract_name, &self.artifacts_path)
    }

    /// Dumps the devnet state, if the session runs on a devnet with a state file
    pub fn persist(&self) -> Result<()> {
        if let Some((devnet, Some(path))) = &self.devnet {
            devnet.dump(path)?;
        }
        Ok(())
    }
}

/// The JSON-RPC endpoint of a network
fn rpc_url(network: Network, rpc_url: Option<&str>) -> Result<Url> {
    match (network, rpc_url) {
        (_, Some(url)) => Ok(Url::parse(url)?),
        (Network::Localhost, None) => Ok(Url::parse(DEVNET_HOST)?),
        (network, None) => Err(eyre!("An RPC URL is required on {network:?}")),
    }
}

/// The chain id transactions on a network are signed for
fn network_chain_id(network: Network) -> FieldElement {
    match network {
        Network::AlphaMainnet => chain_id::MAINNET,
        Network::AlphaGoerli2 => chain_id::TESTNET2,
        Network::AlphaGoerli | Network::Localhost | Network::Devnet => chain_id::TESTNET,
    }
}

/// Finds the session account on the devnet, deploying one for the key if there is none
fn setup_devnet_account(
    devnet: &Devnet,
    address: Option<&str>,
    private_key: FieldElement,
    deployments_path: &Path,
) -> Result<DevnetAccount> {
    let signer = MockSigner::new(private_key);
    let address = match address {
        Some(address) => Some(hex_to_felt(address)?),
        None => read_deployment(deployments_path, ACCOUNT_KEY).ok(),
    };

    if let Some(address) = address.filter(|address| devnet.class_hash_at(*address).is_ok()) {
        debug!("Using devnet account {address:#x}");
        return Ok(DevnetAccount::new(devnet.clone(), address, signer));
    }

    let account = devnet.deploy_account(&signer)?;
    info!("Deployed devnet account at {:#x}", account.address());
    write_deployment(deployments_path, ACCOUNT_KEY, account.address())?;
    Ok(account)
}

// --------------------
// | DEPLOYMENTS FILE |
// --------------------

/// Reads the deployments file
fn read_deployments(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .map_err(|e| eyre!("Error reading deployments file {}: {}", path.display(), e))?;
    serde_json::from_str(&contents).map_err(|e| eyre!("Error parsing deployments file: {}", e))
}

/// Reads a recorded address or class hash from the deployments file
pub fn read_deployment(path: &Path, key: &str) -> Result<FieldElement> {
    let deployments = read_deployments(path)?;
    let value = deployments[DEPLOYMENTS_KEY][key]
        .as_str()
        .ok_or_else(|| eyre!("Could not parse {key} from deployments file"))?;

    Ok(hex_to_felt(value)?)
}

/// Records an address or class hash in the deployments file, creating it if needed
pub fn write_deployment(path: &Path, key: &str, value: FieldElement) -> Result<()> {
    let mut deployments = if path.exists() {
        read_deployments(path)?
    } else {
        json!({})
    };

    deployments[DEPLOYMENTS_KEY][key] = Value::String(format!("{value:#x}"));
    fs::write(path, serde_json::to_string_pretty(&deployments)?)
        .map_err(|e| eyre!("Error writing deployments file {}: {}", path.display(), e))?;

    trace!("Recorded {key} = {value:#x} in {}", path.display());
    Ok(())
}

/// Resolves an address passed on the command line, falling back to the deployments file
pub fn resolve_address(
    session: &Session,
    address: Option<&str>,
    key: &str,
) -> Result<FieldElement> {
    match address {
        Some(address) => Ok(hex_to_felt(address)?),
        None => read_deployment(&session.deployments_path, key),
    }
}

// ---------
// | STEPS |
// ---------

/// A deployed proxy, bound to its implementation's ABI
pub struct ProxyDeployment {
    /// The proxy, seen as its implementation
    pub proxy: ContractHandle,
    /// The class hash of the implementation
    pub implementation_hash: FieldElement,
    /// The class hash of the proxy
    pub proxy_hash: FieldElement,
    /// The hash of the deployment transaction
    pub transaction_hash: FieldElement,
}

/// Declares the contract, unless the hash of an already declared class is given
pub async fn get_or_declare(
    session: &Session,
    contract_name: &str,
    class_hash_hex: Option<String>,
) -> Result<FieldElement> {
    if let Some(class_hash_hex) = class_hash_hex {
        let class_hash = hex_to_felt(&class_hash_hex)?;
        debug!("Using provided {contract_name} class hash: {class_hash:#x}");
        return Ok(class_hash);
    }

    debug!("Declaring {contract_name} contract...");
    let DeclareResult {
        class_hash,
        transaction_hash,
    } = session.client.declare(&session.source(contract_name)).await?;
    session.client.wait_for_tx(transaction_hash).await?;
    debug!("Declared {contract_name} with class hash: {class_hash:#x}");

    write_deployment(&session.deployments_path, &class_hash_key(contract_name), class_hash)?;
    Ok(class_hash)
}

/// A handle to the proxy, seen through the ABI of the given implementation
pub async fn proxy_handle(
    session: &Session,
    proxy_address: FieldElement,
    implementation_name: &str,
) -> Result<ContractHandle> {
    let abi = session
        .client
        .contract_abi(&session.source(implementation_name))
        .await?;
    Ok(ContractHandle::new(proxy_address, abi, session.client.clone()))
}

/// Declares the implementation & the proxy, then deploys the proxy.
///
/// The proxy constructor library-calls the implementation's `initializer`, making the
/// session account the proxy admin, so the proxy is initialized once deployment is accepted.
pub async fn deploy_proxy(
    session: &Session,
    nft_class_hash: Option<String>,
    proxy_class_hash: Option<String>,
) -> Result<ProxyDeployment> {
    let implementation_hash =
        get_or_declare(session, MYSTIS_NFT_CONTRACT_NAME, nft_class_hash).await?;
    let proxy_hash = get_or_declare(session, MYSTIS_PROXY_CONTRACT_NAME, proxy_class_hash).await?;

    let initializer_args = session.config.initializer_args(session.client.address())?;
    let constructor_args = ProxyConstructorArgs {
        implementation_hash,
        selector: selector(INITIALIZER_FN_NAME)?,
        calldata: initializer_args.to_calldata(),
    };

    debug!("Deploying proxy contract...");
    let DeployResult {
        address,
        transaction_hash,
    } = session
        .client
        .deploy(proxy_hash, constructor_args.to_calldata(), session.config.salt())
        .await?;
    session.client.wait_for_tx(transaction_hash).await?;
    write_deployment(&session.deployments_path, PROXY_KEY, address)?;

    // Calls to the proxy go through the implementation's ABI
    let proxy = proxy_handle(session, address, MYSTIS_NFT_CONTRACT_NAME).await?;

    Ok(ProxyDeployment {
        proxy,
        implementation_hash,
        proxy_hash,
        transaction_hash,
    })
}

/// Declares a new implementation & points the proxy at it, returning the proxy
/// rebound to the new implementation's ABI
pub async fn upgrade_proxy(
    session: &Session,
    proxy: &ContractHandle,
    contract_name: &str,
    class_hash_hex: Option<String>,
) -> Result<ContractHandle> {
    let class_hash = get_or_declare(session, contract_name, class_hash_hex).await?;

    debug!("Upgrading proxy to {contract_name}...");
    let upgrade = proxy.call_to(UPGRADE_FN_NAME, vec![class_hash])?;
    let transaction_hash = session
        .client
        .execute(vec![upgrade], session.config.max_fee())
        .await?;
    session.client.wait_for_tx(transaction_hash).await?;
    trace!("Upgrade transaction: {transaction_hash:#x}");

    let abi = session.client.contract_abi(&session.source(contract_name)).await?;
    Ok(proxy.with_abi(abi))
}

/// The number of tokens minted through the proxy
pub async fn total_minted(proxy: &ContractHandle) -> Result<Uint256> {
    let res = proxy.call(TOTAL_MINTED_FN_NAME, vec![]).await?;
    let mut reader = CalldataReader::new(&res);
    let total = reader.next_uint256()?;
    reader.finish()?;

    Ok(total)
}

/// Checks that the session account administers the proxy, then optionally
/// mints a token & checks the minted count went up by one
pub async fn verify_proxy(session: &Session, proxy: &ContractHandle, mint: bool) -> Result<()> {
    info!("Calling `getAdmin` function...");
    let admin = proxy
        .call(GET_ADMIN_FN_NAME, vec![])
        .await?
        .first()
        .copied()
        .ok_or_else(|| eyre!("`getAdmin` returned nothing"))?;

    let account = session.client.address();
    if admin != account {
        return Err(eyre!(
            "Proxy admin {admin:#x} is not the session account {account:#x}"
        ));
    }
    info!("The proxy admin was set to our account: {admin:#x}");

    if !mint {
        return Ok(());
    }

    let minted_before = total_minted(proxy).await?;
    info!("Invoking `mint` function...");
    let mint = proxy.call_to(MINT_FN_NAME, vec![])?;
    let transaction_hash = session
        .client
        .execute(vec![mint], session.config.max_fee())
        .await?;
    session.client.wait_for_tx(transaction_hash).await?;

    info!("Calling `totalMintedHeroes` function...");
    let minted_after = total_minted(proxy).await?;
    let expected = minted_before
        .checked_add(Uint256::from(1_u128))
        .ok_or_else(|| eyre!("Minted count overflowed"))?;
    if minted_after != expected {
        return Err(eyre!(
            "Expected {expected} minted tokens after minting, found {minted_after}"
        ));
    }

    info!("The proxy works! {minted_after} tokens minted");
    Ok(())
}
