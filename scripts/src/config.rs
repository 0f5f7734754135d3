//! The parameters the proxy is deployed & initialized with

use std::{fs, path::Path, time::Duration};

use contracts_common::{
    encoding::{hex_to_felt, long_str_to_array, str_to_felt, to_uint},
    types::InitializerArgs,
};
use contracts_utils::rpc::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use starknet::core::types::FieldElement;
use tracing::debug;

/// The default collection owner
pub const DEFAULT_OWNER: &str =
    "0x02563F77f6d13D521C45605C2440A07Ec63471A39e7fA768abDb8Fdafbf774De";
/// The default collection name
pub const DEFAULT_COLLECTION_NAME: &str = "Mystis";
/// The default collection symbol
pub const DEFAULT_COLLECTION_SYMBOL: &str = "Mystis";
/// The default base token URI
pub const DEFAULT_TOKEN_URI: &str =
    "https://gateway.pinata.cloud/ipfs/XXXXXXXXXXXXXXXXXXXXXXXXXXX/";
/// The default token URI suffix
pub const DEFAULT_TOKEN_URI_SUFFIX: &str = ".json";
/// The default maximum supply
pub const DEFAULT_MAX_SUPPLY: u128 = 800;

/// The parameters the proxy is deployed & initialized with
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// The collection owner, in hex form
    pub owner: String,
    /// The collection name, at most 31 characters
    pub name: String,
    /// The collection symbol, at most 31 characters
    pub symbol: String,
    /// The base token URI, of any length
    pub token_uri: String,
    /// The token URI suffix, at most 31 characters
    pub token_uri_suffix: String,
    /// The maximum number of tokens that can be minted
    pub max_supply: u128,
    /// The salt the proxy is deployed with
    pub salt: u64,
    /// The maximum fee paid per transaction, estimated if omitted
    pub max_fee: Option<u128>,
    /// The interval between transaction status polls
    pub poll_interval_ms: u64,
    /// The number of transaction status polls before giving up
    pub max_poll_attempts: u32,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            name: DEFAULT_COLLECTION_NAME.to_string(),
            symbol: DEFAULT_COLLECTION_SYMBOL.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            token_uri_suffix: DEFAULT_TOKEN_URI_SUFFIX.to_string(),
            max_supply: DEFAULT_MAX_SUPPLY,
            salt: 0,
            max_fee: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl DeployConfig {
    /// Loads a config file, or the defaults if no file is given.
    /// Fields missing from the file take their default value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        debug!("Loading deploy config from {}", path.display());
        let json = fs::read_to_string(path)
            .map_err(|e| eyre!("Error reading config {}: {}", path.display(), e))?;
        serde_json::from_str(&json).map_err(|e| eyre!("Error parsing config: {}", e))
    }

    /// The arguments of the implementation's `initializer`, with the given proxy admin
    pub fn initializer_args(&self, proxy_admin: FieldElement) -> Result<InitializerArgs> {
        Ok(InitializerArgs {
            name: str_to_felt(&self.name)?,
            symbol: str_to_felt(&self.symbol)?,
            owner: hex_to_felt(&self.owner)?,
            token_uri: long_str_to_array(&self.token_uri)?,
            token_uri_suffix: str_to_felt(&self.token_uri_suffix)?,
            max_supply: to_uint(self.max_supply),
            proxy_admin,
        })
    }

    /// The salt the proxy is deployed with
    pub fn salt(&self) -> FieldElement {
        FieldElement::from(self.salt)
    }

    /// The maximum fee paid per transaction
    pub fn max_fee(&self) -> Option<FieldElement> {
        self.max_fee.map(FieldElement::from)
    }

    /// The interval between transaction status polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
