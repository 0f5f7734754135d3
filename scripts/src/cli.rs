//! Command line interface for the Starknet scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use contracts_common::constants::{
    MYSTIS_NFT_CONTRACT_NAME, MYSTIS_NFT_V2_CONTRACT_NAME, MYSTIS_PROXY_CONTRACT_NAME,
};
use eyre::Result;
use tracing::debug;

use crate::commands::{
    abi::dump_abi,
    declare::declare,
    deploy::deploy_and_initialize,
    upgrade::upgrade,
    utils::{verify_proxy, Session},
    verify::verify,
};

/// The default directory holding compiled contracts & their ABIs
pub const DEFAULT_ARTIFACTS_PATH: &str = "artifacts";
/// The default file deployed addresses & class hashes are recorded in
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Scripts to deploy, upgrade & verify the Mystis NFT proxy
pub struct CliArgs {
    #[command(flatten)]
    /// How to connect to the network
    pub session: SessionArgs,

    #[command(subcommand)]
    /// The script to run
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
/// The network & account transactions are sent with
pub struct SessionArgs {
    #[arg(short, long, long_help, value_enum, default_value_t = Network::Devnet, global = true)]
    /// Which network you'd like to use.
    /// If `localhost`, the node is expected to be running on port 5050.
    /// If `devnet`, an in-process devnet is used, persisted to `--devnet-state`.
    pub network: Network,

    #[arg(long, long_help, global = true)]
    /// The JSON-RPC endpoint to use, overriding the network's default
    pub rpc_url: Option<String>,

    #[arg(short, long, long_help, global = true)]
    /// The account address associated with the private key.
    /// On the devnet, an account is deployed for the key if this is omitted.
    pub address: Option<String>,

    #[arg(short, long, long_help, env = "STARKNET_PRIVATE_KEY", global = true)]
    /// The private key of the account from which to send the transactions, in hex form.
    /// Defaults to the devnet's default key.
    pub private_key: Option<String>,

    #[arg(long, long_help, default_value = DEFAULT_ARTIFACTS_PATH, global = true)]
    /// The path to a folder containing the compiled contracts, named `<Contract>.json`,
    /// and their ABIs, named `abis/<Contract>.json`
    pub artifacts_path: PathBuf,

    #[arg(long, long_help, global = true)]
    /// The file the devnet state is loaded from & dumped to
    pub devnet_state: Option<PathBuf>,

    #[arg(long, long_help, default_value = DEFAULT_DEPLOYMENTS_PATH, global = true)]
    /// The file deployed addresses & class hashes are recorded in
    pub deployments_path: PathBuf,

    #[arg(short, long, long_help, global = true)]
    /// A JSON file overriding the default deployment parameters
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// The scripts that can be run
pub enum Commands {
    /// Declares a contract class
    Declare(DeclareArgs),

    /// Declares the implementation & proxy classes, then deploys the proxy,
    /// which initializes the implementation in its constructor
    Deploy(DeployArgs),

    /// Declares a new implementation class & points the proxy at it
    Upgrade(UpgradeArgs),

    /// Checks the deployed proxy: its admin, then a mint
    Verify(VerifyArgs),

    /// Deploys the proxy & verifies it
    Run(DeployArgs),

    /// Writes the ABI of a built-in contract class to the artifacts directory
    DumpAbi(DumpAbiArgs),
}

impl Commands {
    /// Runs the command, persisting the devnet state afterwards if one is used
    pub async fn run(self, session_args: SessionArgs) -> Result<()> {
        // Writing ABIs needs no account
        let command = match self {
            Commands::DumpAbi(args) => return dump_abi(args, &session_args.artifacts_path),
            command => command,
        };

        debug!("Setting up account...");
        let session = Session::setup(&session_args)?;

        match command {
            Commands::Declare(args) => declare(args, &session).await?,
            Commands::Deploy(args) => {
                deploy_and_initialize(args, &session).await?;
            },
            Commands::Upgrade(args) => upgrade(args, &session).await?,
            Commands::Verify(args) => verify(args, &session).await?,
            Commands::Run(args) => {
                let proxy = deploy_and_initialize(args, &session).await?;
                verify_proxy(&session, &proxy, true /* mint */).await?;
            },
            Commands::DumpAbi(args) => dump_abi(args, &session.artifacts_path)?,
        }

        session.persist()
    }
}

#[derive(Args, Debug)]
/// Arguments of the `declare` command
pub struct DeclareArgs {
    #[arg(short = 'C', long, long_help, value_enum)]
    /// The contract to declare
    pub contract: Contract,
}

#[derive(Args, Debug)]
/// Arguments of the `deploy` & `run` commands
pub struct DeployArgs {
    #[arg(long, long_help)]
    /// The class hash of an already declared implementation, in hex form.
    /// If omitted, the implementation is declared.
    pub nft_class_hash: Option<String>,

    #[arg(long, long_help)]
    /// The class hash of an already declared proxy, in hex form.
    /// If omitted, the proxy is declared.
    pub proxy_class_hash: Option<String>,
}

#[derive(Args, Debug)]
/// Arguments of the `upgrade` command
pub struct UpgradeArgs {
    #[arg(long, long_help)]
    /// The address of the proxy contract.
    /// If omitted, it is read from the deployments file.
    pub proxy_address: Option<String>,

    #[arg(short = 'C', long, long_help, value_enum, default_value_t = Contract::MystisNftV2)]
    /// The implementation to upgrade to
    pub contract: Contract,

    #[arg(long, long_help)]
    /// The class hash of an already declared implementation, in hex form.
    /// If omitted, the implementation is declared.
    pub class_hash: Option<String>,
}

#[derive(Args, Debug)]
/// Arguments of the `verify` command
pub struct VerifyArgs {
    #[arg(long, long_help)]
    /// The address of the proxy contract.
    /// If omitted, it is read from the deployments file.
    pub proxy_address: Option<String>,

    #[arg(long)]
    /// Only check the admin, without minting
    pub skip_mint: bool,
}

#[derive(Args, Debug)]
/// Arguments of the `dump-abi` command
pub struct DumpAbiArgs {
    #[arg(short = 'C', long, long_help, value_enum)]
    /// The contract whose ABI to write
    pub contract: Contract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
/// The contracts the scripts manage
pub enum Contract {
    /// The V1 NFT implementation
    MystisNft,
    /// The V2 NFT implementation, the upgrade target
    MystisNftV2,
    /// The proxy
    MystisProxy,
}

impl Contract {
    /// The name of the contract class & its artifacts
    pub fn name(&self) -> &'static str {
        match self {
            Contract::MystisNft => MYSTIS_NFT_CONTRACT_NAME,
            Contract::MystisNftV2 => MYSTIS_NFT_V2_CONTRACT_NAME,
            Contract::MystisProxy => MYSTIS_PROXY_CONTRACT_NAME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
/// The networks the scripts can target
pub enum Network {
    /// StarkNet alpha mainnet
    AlphaMainnet,
    /// StarkNet alpha Goerli testnet
    AlphaGoerli,
    /// StarkNet alpha Goerli 2 testnet
    AlphaGoerli2,
    /// A node running on localhost
    Localhost,
    /// The in-process devnet
    Devnet,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_upgrade() {
        let args = CliArgs::try_parse_from([
            "starknet-scripts",
            "upgrade",
            "--network",
            "alpha-goerli",
            "--proxy-address",
            "0x1234",
        ])
        .unwrap();

        assert_eq!(args.session.network, Network::AlphaGoerli);
        match args.command {
            Commands::Upgrade(upgrade) => {
                assert_eq!(upgrade.contract, Contract::MystisNftV2);
                assert_eq!(upgrade.proxy_address.as_deref(), Some("0x1234"));
            },
            command => panic!("unexpected command {command:?}"),
        }
    }
}
