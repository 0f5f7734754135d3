//! Constants shared by the contract models, the deploy scripts & the tests

// ---------------------
// | ENCODING CONSTANTS |
// ---------------------

/// The maximum number of ASCII characters that fit into a single Cairo short string
pub const SHORT_STRING_MAX_LEN: usize = 31;

/// The number of bytes it takes to represent a field element
pub const NUM_BYTES_FELT: usize = 32;

/// The number of bytes it takes to represent an unsigned 128-bit integer
pub const NUM_BYTES_U128: usize = 16;

/// The number of field elements it takes to encode an unsigned 256-bit integer
pub const NUM_FELTS_U256: usize = 2;

// ------------------
// | CONTRACT NAMES |
// ------------------

/// Name of the NFT implementation contract
pub const MYSTIS_NFT_CONTRACT_NAME: &str = "MystisNFT";

/// Name of the NFT implementation contract used as an upgrade target
pub const MYSTIS_NFT_V2_CONTRACT_NAME: &str = "MystisNFTV2";

/// Name of the proxy contract
pub const MYSTIS_PROXY_CONTRACT_NAME: &str = "MystisProxy";

/// Name of the account contract
pub const ACCOUNT_CONTRACT_NAME: &str = "Account";

/// Name of the universal deployer contract
pub const UDC_CONTRACT_NAME: &str = "UniversalDeployer";

/// Address of the universal deployer contract, identical on every public network
pub const UDC_ADDRESS: &str = "0x041a78e741e5af2fec34b695679bc6891742439f7afb8484ecd7766661ad02bf";

// ---------------------
// | ENTRY POINT NAMES |
// ---------------------

/// Name of the constructor entry point
pub const CONSTRUCTOR_FN_NAME: &str = "constructor";
/// Name of the proxy fallback entry point
pub const DEFAULT_FN_NAME: &str = "__default__";
/// Name of the account multicall entry point
pub const EXECUTE_FN_NAME: &str = "__execute__";

/// Name of the implementation's initializer
pub const INITIALIZER_FN_NAME: &str = "initializer";
/// Name of the admin getter
pub const GET_ADMIN_FN_NAME: &str = "getAdmin";
/// Name of the admin setter
pub const SET_ADMIN_FN_NAME: &str = "setAdmin";
/// Name of the upgrade entry point
pub const UPGRADE_FN_NAME: &str = "upgrade";
/// Name of the proxy's implementation hash getter
pub const GET_IMPLEMENTATION_HASH_FN_NAME: &str = "getImplementationHash";

/// Name of the collection name getter
pub const NAME_FN_NAME: &str = "name";
/// Name of the collection symbol getter
pub const SYMBOL_FN_NAME: &str = "symbol";
/// Name of the collection owner getter
pub const OWNER_FN_NAME: &str = "owner";
/// Name of the ownership transfer entry point
pub const TRANSFER_OWNERSHIP_FN_NAME: &str = "transferOwnership";
/// Name of the max supply getter
pub const MAX_SUPPLY_FN_NAME: &str = "maxSupply";
/// Name of the minted supply getter
pub const TOTAL_MINTED_FN_NAME: &str = "totalMintedHeroes";
/// Name of the mint entry point
pub const MINT_FN_NAME: &str = "mint";
/// Name of the burn entry point, only exposed by the upgrade target
pub const BURN_FN_NAME: &str = "burn";
/// Name of the token URI getter
pub const TOKEN_URI_FN_NAME: &str = "tokenURI";
/// Name of the balance getter
pub const BALANCE_OF_FN_NAME: &str = "balanceOf";
/// Name of the token owner getter
pub const OWNER_OF_FN_NAME: &str = "ownerOf";
/// Name of the approval entry point
pub const APPROVE_FN_NAME: &str = "approve";
/// Name of the approval getter
pub const GET_APPROVED_FN_NAME: &str = "getApproved";
/// Name of the transfer entry point
pub const TRANSFER_FROM_FN_NAME: &str = "transferFrom";
/// Name of the implementation version getter
pub const VERSION_FN_NAME: &str = "version";

/// Name of the account public key getter
pub const GET_PUBLIC_KEY_FN_NAME: &str = "getPublicKey";
/// Name of the account nonce getter
pub const GET_NONCE_FN_NAME: &str = "getNonce";

/// Name of the universal deployer's deploy entry point
pub const DEPLOY_CONTRACT_FN_NAME: &str = "deployContract";

// ---------------
// | EVENT NAMES |
// ---------------

/// Emitted when the proxy admin changes
pub const ADMIN_CHANGED_EVENT_NAME: &str = "AdminChanged";
/// Emitted when the proxy implementation changes
pub const UPGRADED_EVENT_NAME: &str = "Upgraded";
/// Emitted when the collection ownership changes
pub const OWNERSHIP_TRANSFERRED_EVENT_NAME: &str = "OwnershipTransferred";
/// Emitted when a token changes hands, including mints & burns
pub const TRANSFER_EVENT_NAME: &str = "Transfer";
/// Emitted when a token approval is set
pub const APPROVAL_EVENT_NAME: &str = "Approval";
/// Emitted by the universal deployer for every deployment
pub const CONTRACT_DEPLOYED_EVENT_NAME: &str = "ContractDeployed";

// -------------------
// | REVERT MESSAGES |
// -------------------

/// Revert message when initializing an already-initialized proxy
pub const ALREADY_INITIALIZED_MSG: &str = "Proxy: contract already initialized";
/// Revert message when a non-admin calls an admin-only entry point
pub const NOT_ADMIN_MSG: &str = "Proxy: caller is not admin";
/// Revert message when the admin would be set to zero
pub const ZERO_ADMIN_MSG: &str = "Proxy: admin cannot be the zero address";
/// Revert message when upgrading to a zero class hash
pub const ZERO_IMPLEMENTATION_MSG: &str = "Proxy: implementation hash cannot be zero";
/// Revert message when a non-owner calls an owner-only entry point
pub const NOT_OWNER_MSG: &str = "Ownable: caller is not the owner";
/// Revert message when transferring ownership to zero
pub const ZERO_OWNER_MSG: &str = "Ownable: new owner is the zero address";
/// Revert message when minting past the max supply
pub const MAX_SUPPLY_REACHED_MSG: &str = "MystisNFT: max supply reached";
