//! The Mystis NFT implementation contract, executed behind `MystisProxy`.
//!
//! Every entry point runs in the proxy's storage context. The collection is initialized once
//! through the proxy's constructor, after which anyone can mint the next token until the max
//! supply is reached. `MystisNFTV2` is the upgrade target: it keeps the storage layout,
//! reports a new version & adds `burn`.

use contracts_common::{
    abi::{ContractAbi, FELT_ARRAY_TYPE, FELT_TYPE, UINT256_TYPE},
    calldata::{CalldataReader, CalldataSerializable},
    constants::{
        ADMIN_CHANGED_EVENT_NAME, APPROVAL_EVENT_NAME, APPROVE_FN_NAME, BALANCE_OF_FN_NAME,
        BURN_FN_NAME, GET_ADMIN_FN_NAME, GET_APPROVED_FN_NAME, INITIALIZER_FN_NAME,
        MAX_SUPPLY_FN_NAME, MAX_SUPPLY_REACHED_MSG, MINT_FN_NAME, MYSTIS_NFT_CONTRACT_NAME,
        MYSTIS_NFT_V2_CONTRACT_NAME, NAME_FN_NAME, OWNERSHIP_TRANSFERRED_EVENT_NAME,
        OWNER_FN_NAME, OWNER_OF_FN_NAME, SET_ADMIN_FN_NAME, SYMBOL_FN_NAME,
        TOKEN_URI_FN_NAME, TOTAL_MINTED_FN_NAME, TRANSFER_EVENT_NAME, TRANSFER_FROM_FN_NAME,
        TRANSFER_OWNERSHIP_FN_NAME, UPGRADED_EVENT_NAME, UPGRADE_FN_NAME, VERSION_FN_NAME,
    },
    encoding::{felt_to_usize, long_str_to_array},
    types::Uint256,
};
use starknet::core::types::FieldElement;
use thiserror::Error;

use crate::{errors::ExecutionError, execution::ExecutionContext, storage::StorageVar};

use super::{
    components::{erc721::Erc721, ownable::Ownable, proxy::Proxy},
    ContractClass,
};

/// The number of parts the base token URI is split into
const TOKEN_URI_LEN: StorageVar = StorageVar::new("MystisNFT_token_uri_len");
/// The parts of the base token URI, keyed by index
const TOKEN_URI: StorageVar = StorageVar::new("MystisNFT_token_uri");
/// The token URI suffix
const TOKEN_URI_SUFFIX: StorageVar = StorageVar::new("MystisNFT_token_uri_suffix");
/// The maximum number of tokens that can be minted
const MAX_SUPPLY: StorageVar = StorageVar::new("MystisNFT_max_supply");
/// The number of tokens minted so far, which is also the last minted token ID
const TOTAL_MINTED: StorageVar = StorageVar::new("MystisNFT_total_minted");

/// Errors raised by collection checks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NftError {
    /// Every token has been minted
    #[error("{}", MAX_SUPPLY_REACHED_MSG)]
    MaxSupplyReached,
    /// A URI was queried for a token that does not exist
    #[error("MystisNFT: URI query for nonexistent token")]
    NonexistentToken,
    /// Only the token owner can burn it
    #[error("MystisNFT: caller is not the token owner")]
    NotTokenOwner,
}

/// The implementation versions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NftVersion {
    /// The initially deployed implementation
    V1,
    /// The upgrade target
    V2,
}

impl NftVersion {
    /// The version number reported by the `version` entry point
    pub fn number(&self) -> u8 {
        match self {
            NftVersion::V1 => 1,
            NftVersion::V2 => 2,
        }
    }
}

/// The Mystis NFT implementation class
#[derive(Debug)]
pub struct MystisNft {
    /// The implementation version
    version: NftVersion,
    /// The ABI of the version
    abi: ContractAbi,
}

impl MystisNft {
    /// The initially deployed implementation
    pub fn v1() -> Self {
        Self {
            version: NftVersion::V1,
            abi: Self::abi_for(NftVersion::V1),
        }
    }

    /// The upgrade target
    pub fn v2() -> Self {
        Self {
            version: NftVersion::V2,
            abi: Self::abi_for(NftVersion::V2),
        }
    }

    /// Builds the ABI exposed by a version
    fn abi_for(version: NftVersion) -> ContractAbi {
        let abi = ContractAbi::new()
            .with_uint256_struct()
            .with_event(
                ADMIN_CHANGED_EVENT_NAME,
                &[("previousAdmin", FELT_TYPE), ("newAdmin", FELT_TYPE)],
            )
            .with_event(UPGRADED_EVENT_NAME, &[("implementation", FELT_TYPE)])
            .with_event(
                OWNERSHIP_TRANSFERRED_EVENT_NAME,
                &[("previousOwner", FELT_TYPE), ("newOwner", FELT_TYPE)],
            )
            .with_event(
                TRANSFER_EVENT_NAME,
                &[("from_", FELT_TYPE), ("to", FELT_TYPE), ("tokenId", UINT256_TYPE)],
            )
            .with_event(
                APPROVAL_EVENT_NAME,
                &[("owner", FELT_TYPE), ("approved", FELT_TYPE), ("tokenId", UINT256_TYPE)],
            )
            .with_external(
                INITIALIZER_FN_NAME,
                &[
                    ("name", FELT_TYPE),
                    ("symbol", FELT_TYPE),
                    ("owner", FELT_TYPE),
                    ("tokenURI_len", FELT_TYPE),
                    ("tokenURI", FELT_ARRAY_TYPE),
                    ("tokenURISuffix", FELT_TYPE),
                    ("maxSupply", UINT256_TYPE),
                    ("proxy_admin", FELT_TYPE),
                ],
                &[],
            )
            .with_external(UPGRADE_FN_NAME, &[("new_implementation", FELT_TYPE)], &[])
            .with_view(GET_ADMIN_FN_NAME, &[], &[("admin", FELT_TYPE)])
            .with_external(SET_ADMIN_FN_NAME, &[("new_admin", FELT_TYPE)], &[])
            .with_view(VERSION_FN_NAME, &[], &[("version", FELT_TYPE)])
            .with_view(NAME_FN_NAME, &[], &[("name", FELT_TYPE)])
            .with_view(SYMBOL_FN_NAME, &[], &[("symbol", FELT_TYPE)])
            .with_view(OWNER_FN_NAME, &[], &[("owner", FELT_TYPE)])
            .with_external(TRANSFER_OWNERSHIP_FN_NAME, &[("newOwner", FELT_TYPE)], &[])
            .with_view(MAX_SUPPLY_FN_NAME, &[], &[("maxSupply", UINT256_TYPE)])
            .with_view(TOTAL_MINTED_FN_NAME, &[], &[("totalMinted", UINT256_TYPE)])
            .with_view(
                TOKEN_URI_FN_NAME,
                &[("tokenId", UINT256_TYPE)],
                &[("tokenURI_len", FELT_TYPE), ("tokenURI", FELT_ARRAY_TYPE)],
            )
            .with_view(BALANCE_OF_FN_NAME, &[("owner", FELT_TYPE)], &[("balance", UINT256_TYPE)])
            .with_view(OWNER_OF_FN_NAME, &[("tokenId", UINT256_TYPE)], &[("owner", FELT_TYPE)])
            .with_view(
                GET_APPROVED_FN_NAME,
                &[("tokenId", UINT256_TYPE)],
                &[("approved", FELT_TYPE)],
            )
            .with_external(APPROVE_FN_NAME, &[("to", FELT_TYPE), ("tokenId", UINT256_TYPE)], &[])
            .with_external(
                TRANSFER_FROM_FN_NAME,
                &[("from_", FELT_TYPE), ("to", FELT_TYPE), ("tokenId", UINT256_TYPE)],
                &[],
            )
            .with_external(MINT_FN_NAME, &[], &[("tokenId", UINT256_TYPE)]);

        match version {
            NftVersion::V1 => abi,
            NftVersion::V2 => abi.with_external(BURN_FN_NAME, &[("tokenId", UINT256_TYPE)], &[]),
        }
    }

    /// The implementation version
    pub fn version(&self) -> NftVersion {
        self.version
    }

    // ----------------
    // | ENTRY POINTS |
    // ----------------

    /// Initializes the collection & the proxy, can only succeed once
    fn initializer(
        ctx: &mut ExecutionContext,
        calldata: &[FieldElement],
    ) -> Result<(), ExecutionError> {
        Proxy::assert_not_initialized(ctx)?;

        let mut reader = CalldataReader::new(calldata);
        let name = reader.next_felt()?;
        let symbol = reader.next_felt()?;
        let owner = reader.next_felt()?;
        let token_uri = reader.next_array()?;
        let token_uri_suffix = reader.next_felt()?;
        let max_supply = reader.next_uint256()?;
        let proxy_admin = reader.next_felt()?;
        reader.finish()?;

        Proxy::initializer(ctx, proxy_admin)?;
        Erc721::initializer(ctx, name, symbol)?;
        Ownable::initializer(ctx, owner)?;

        TOKEN_URI_LEN.write(ctx, &[], FieldElement::from(token_uri.len()))?;
        for (i, part) in token_uri.into_iter().enumerate() {
            TOKEN_URI.write(ctx, &[FieldElement::from(i)], part)?;
        }
        TOKEN_URI_SUFFIX.write(ctx, &[], token_uri_suffix)?;
        MAX_SUPPLY.write_uint256(ctx, &[], max_supply)
    }

    /// Mints the next token to the caller, returning its ID
    fn mint(ctx: &mut ExecutionContext) -> Result<Uint256, ExecutionError> {
        let total_minted = TOTAL_MINTED.read_uint256(ctx, &[])?;
        if total_minted >= MAX_SUPPLY.read_uint256(ctx, &[])? {
            return Err(NftError::MaxSupplyReached.into());
        }

        let token_id = total_minted
            .checked_add(Uint256::from(1_u128))
            .ok_or(NftError::MaxSupplyReached)?;
        let recipient = ctx.caller_address();
        Erc721::mint(ctx, recipient, token_id)?;
        TOTAL_MINTED.write_uint256(ctx, &[], token_id)?;

        Ok(token_id)
    }

    /// Burns a token held by the caller
    fn burn(ctx: &mut ExecutionContext, token_id: Uint256) -> Result<(), ExecutionError> {
        if Erc721::owner_of(ctx, token_id)? != ctx.caller_address() {
            return Err(NftError::NotTokenOwner.into());
        }
        Erc721::burn(ctx, token_id)
    }

    /// The URI of an existing token: the base URI, its decimal ID & the suffix
    fn token_uri(
        ctx: &ExecutionContext,
        token_id: Uint256,
    ) -> Result<Vec<FieldElement>, ExecutionError> {
        if !Erc721::exists(ctx, token_id)? {
            return Err(NftError::NonexistentToken.into());
        }

        let len = felt_to_usize(TOKEN_URI_LEN.read(ctx, &[])?)?;
        let mut uri = Vec::with_capacity(len + 2);
        for i in 0..len {
            uri.push(TOKEN_URI.read(ctx, &[FieldElement::from(i)])?);
        }
        uri.extend(long_str_to_array(&token_id.to_string())?);
        uri.push(TOKEN_URI_SUFFIX.read(ctx, &[])?);

        Ok(uri)
    }
}

impl ContractClass for MystisNft {
    fn name(&self) -> &'static str {
        match self.version {
            NftVersion::V1 => MYSTIS_NFT_CONTRACT_NAME,
            NftVersion::V2 => MYSTIS_NFT_V2_CONTRACT_NAME,
        }
    }

    fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        selector: FieldElement,
        calldata: &[FieldElement],
    ) -> Result<Vec<FieldElement>, ExecutionError> {
        let entry_point = self.entry_point_name(selector)?;
        if entry_point == INITIALIZER_FN_NAME {
            Self::initializer(ctx, calldata)?;
            return Ok(vec![]);
        }

        let mut reader = CalldataReader::new(calldata);
        let retdata = match entry_point {
            UPGRADE_FN_NAME => {
                Proxy::upgrade(ctx, reader.next_felt()?)?;
                vec![]
            },
            GET_ADMIN_FN_NAME => vec![Proxy::get_admin(ctx)?],
            SET_ADMIN_FN_NAME => {
                Proxy::set_admin(ctx, reader.next_felt()?)?;
                vec![]
            },
            VERSION_FN_NAME => vec![FieldElement::from(self.version.number())],
            NAME_FN_NAME => vec![Erc721::name(ctx)?],
            SYMBOL_FN_NAME => vec![Erc721::symbol(ctx)?],
            OWNER_FN_NAME => vec![Ownable::owner(ctx)?],
            TRANSFER_OWNERSHIP_FN_NAME => {
                Ownable::transfer_ownership(ctx, reader.next_felt()?)?;
                vec![]
            },
            MAX_SUPPLY_FN_NAME => MAX_SUPPLY.read_uint256(ctx, &[])?.to_calldata(),
            TOTAL_MINTED_FN_NAME => TOTAL_MINTED.read_uint256(ctx, &[])?.to_calldata(),
            TOKEN_URI_FN_NAME => Self::token_uri(ctx, reader.next_uint256()?)?.to_calldata(),
            BALANCE_OF_FN_NAME => Erc721::balance_of(ctx, reader.next_felt()?)?.to_calldata(),
            OWNER_OF_FN_NAME => vec![Erc721::owner_of(ctx, reader.next_uint256()?)?],
            GET_APPROVED_FN_NAME => vec![Erc721::get_approved(ctx, reader.next_uint256()?)?],
            APPROVE_FN_NAME => {
                let to = reader.next_felt()?;
                Erc721::approve(ctx, to, reader.next_uint256()?)?;
                vec![]
            },
            TRANSFER_FROM_FN_NAME => {
                let from = reader.next_felt()?;
                let to = reader.next_felt()?;
                Erc721::transfer_from(ctx, from, to, reader.next_uint256()?)?;
                vec![]
            },
            MINT_FN_NAME => Self::mint(ctx)?.to_calldata(),
            BURN_FN_NAME => {
                Self::burn(ctx, reader.next_uint256()?)?;
                vec![]
            },
            _ => return Err(ExecutionError::EntryPointNotFound { selector }),
        };

        reader.finish()?;
        Ok(retdata)
    }
}
