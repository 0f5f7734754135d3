//! Mirrors OpenZeppelin's Cairo 0 `ERC721` library:
//! https://github.com/OpenZeppelin/cairo-contracts/blob/v0.5.0/src/openzeppelin/token/erc721/library.cairo
//!
//! Token IDs are `Uint256`s, stored & hashed as two limbs. Operator approvals are not supported.

use contracts_common::{
    constants::{APPROVAL_EVENT_NAME, TRANSFER_EVENT_NAME},
    types::Uint256,
};
use starknet::core::types::FieldElement;
use thiserror::Error;

use crate::{errors::ExecutionError, execution::ExecutionContext, storage::StorageVar};

/// The collection name
const ERC721_NAME: StorageVar = StorageVar::new("ERC721_name");
/// The collection symbol
const ERC721_SYMBOL: StorageVar = StorageVar::new("ERC721_symbol");
/// Token owners, keyed by token ID
const ERC721_OWNERS: StorageVar = StorageVar::new("ERC721_owners");
/// Token balances, keyed by account
const ERC721_BALANCES: StorageVar = StorageVar::new("ERC721_balances");
/// Token approvals, keyed by token ID
const ERC721_TOKEN_APPROVALS: StorageVar = StorageVar::new("ERC721_token_approvals");

/// Errors raised by token checks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Erc721Error {
    /// A balance was queried for the zero address
    #[error("ERC721: balance query for the zero address")]
    ZeroAddressBalance,
    /// The token does not exist
    #[error("ERC721: owner query for nonexistent token")]
    NonexistentToken,
    /// The token is already owned
    #[error("ERC721: token already minted")]
    AlreadyMinted,
    /// The token was minted or transferred to the zero address
    #[error("ERC721: cannot transfer to the zero address")]
    ZeroRecipient,
    /// The token was approved to its own owner
    #[error("ERC721: approval to current owner")]
    ApprovalToOwner,
    /// Only the owner can set approvals
    #[error("ERC721: approve caller is not owner")]
    ApproveCallerNotOwner,
    /// The caller is neither the owner nor approved
    #[error("ERC721: either is not approved or the caller is the zero address")]
    NotApprovedOrOwner,
    /// The `from` address does not own the token
    #[error("ERC721: transfer from incorrect owner")]
    IncorrectOwner,
    /// A balance over- or underflowed
    #[error("ERC721: balance overflow")]
    BalanceOverflow,
}

/// The `ERC721` component
pub struct Erc721;

impl Erc721 {
    /// Sets the collection metadata
    pub fn initializer(
        ctx: &mut ExecutionContext,
        name: FieldElement,
        symbol: FieldElement,
    ) -> Result<(), ExecutionError> {
        ERC721_NAME.write(ctx, &[], name)?;
        ERC721_SYMBOL.write(ctx, &[], symbol)
    }

    /// The collection name
    pub fn name(ctx: &ExecutionContext) -> Result<FieldElement, ExecutionError> {
        ERC721_NAME.read(ctx, &[])
    }

    /// The collection symbol
    pub fn symbol(ctx: &ExecutionContext) -> Result<FieldElement, ExecutionError> {
        ERC721_SYMBOL.read(ctx, &[])
    }

    /// The number of tokens held by an account
    pub fn balance_of(
        ctx: &ExecutionContext,
        owner: FieldElement,
    ) -> Result<Uint256, ExecutionError> {
        if owner == FieldElement::ZERO {
            return Err(Erc721Error::ZeroAddressBalance.into());
        }
        ERC721_BALANCES.read_uint256(ctx, &[owner])
    }

    /// The owner of an existing token
    pub fn owner_of(
        ctx: &ExecutionContext,
        token_id: Uint256,
    ) -> Result<FieldElement, ExecutionError> {
        let owner = ERC721_OWNERS.read(ctx, &token_id.to_felts())?;
        if owner == FieldElement::ZERO {
            return Err(Erc721Error::NonexistentToken.into());
        }
        Ok(owner)
    }

    /// Whether the token has been minted & not burnt
    pub fn exists(ctx: &ExecutionContext, token_id: Uint256) -> Result<bool, ExecutionError> {
        Ok(ERC721_OWNERS.read(ctx, &token_id.to_felts())? != FieldElement::ZERO)
    }

    /// The address approved to transfer an existing token
    pub fn get_approved(
        ctx: &ExecutionContext,
        token_id: Uint256,
    ) -> Result<FieldElement, ExecutionError> {
        if !Self::exists(ctx, token_id)? {
            return Err(Erc721Error::NonexistentToken.into());
        }
        ERC721_TOKEN_APPROVALS.read(ctx, &token_id.to_felts())
    }

    /// Approves an address to transfer a token. Only callable by the token owner.
    pub fn approve(
        ctx: &mut ExecutionContext,
        to: FieldElement,
        token_id: Uint256,
    ) -> Result<(), ExecutionError> {
        let owner = Self::owner_of(ctx, token_id)?;
        if to == owner {
            return Err(Erc721Error::ApprovalToOwner.into());
        }
        if ctx.caller_address() != owner {
            return Err(Erc721Error::ApproveCallerNotOwner.into());
        }

        Self::_approve(ctx, owner, to, token_id)
    }

    /// Transfers a token. Only callable by the token owner or its approved address.
    pub fn transfer_from(
        ctx: &mut ExecutionContext,
        from: FieldElement,
        to: FieldElement,
        token_id: Uint256,
    ) -> Result<(), ExecutionError> {
        let caller = ctx.caller_address();
        if caller == FieldElement::ZERO || !Self::is_approved_or_owner(ctx, caller, token_id)? {
            return Err(Erc721Error::NotApprovedOrOwner.into());
        }

        Self::_transfer(ctx, from, to, token_id)
    }

    /// Mints a new token to a non-zero address
    pub fn mint(
        ctx: &mut ExecutionContext,
        to: FieldElement,
        token_id: Uint256,
    ) -> Result<(), ExecutionError> {
        if to == FieldElement::ZERO {
            return Err(Erc721Error::ZeroRecipient.into());
        }
        if Self::exists(ctx, token_id)? {
            return Err(Erc721Error::AlreadyMinted.into());
        }

        Self::add_to_balance(ctx, to)?;
        ERC721_OWNERS.write(ctx, &token_id.to_felts(), to)?;
        Self::emit_transfer(ctx, FieldElement::ZERO, to, token_id);
        Ok(())
    }

    /// Destroys an existing token, clearing its approval
    pub fn burn(ctx: &mut ExecutionContext, token_id: Uint256) -> Result<(), ExecutionError> {
        let owner = Self::owner_of(ctx, token_id)?;

        Self::_approve(ctx, owner, FieldElement::ZERO, token_id)?;
        Self::sub_from_balance(ctx, owner)?;
        ERC721_OWNERS.write(ctx, &token_id.to_felts(), FieldElement::ZERO)?;
        Self::emit_transfer(ctx, owner, FieldElement::ZERO, token_id);
        Ok(())
    }

    // -----------
    // | HELPERS |
    // -----------

    /// Whether the spender owns or is approved for the token
    fn is_approved_or_owner(
        ctx: &ExecutionContext,
        spender: FieldElement,
        token_id: Uint256,
    ) -> Result<bool, ExecutionError> {
        let owner = Self::owner_of(ctx, token_id)?;
        Ok(spender == owner || spender == Self::get_approved(ctx, token_id)?)
    }

    /// Moves a token between accounts, clearing its approval
    fn _transfer(
        ctx: &mut ExecutionContext,
        from: FieldElement,
        to: FieldElement,
        token_id: Uint256,
    ) -> Result<(), ExecutionError> {
        let owner = Self::owner_of(ctx, token_id)?;
        if owner != from {
            return Err(Erc721Error::IncorrectOwner.into());
        }
        if to == FieldElement::ZERO {
            return Err(Erc721Error::ZeroRecipient.into());
        }

        Self::_approve(ctx, owner, FieldElement::ZERO, token_id)?;
        Self::sub_from_balance(ctx, from)?;
        Self::add_to_balance(ctx, to)?;
        ERC721_OWNERS.write(ctx, &token_id.to_felts(), to)?;
        Self::emit_transfer(ctx, from, to, token_id);
        Ok(())
    }

    /// Sets a token approval
    fn _approve(
        ctx: &mut ExecutionContext,
        owner: FieldElement,
        to: FieldElement,
        token_id: Uint256,
    ) -> Result<(), ExecutionError> {
        ERC721_TOKEN_APPROVALS.write(ctx, &token_id.to_felts(), to)?;
        let [low, high] = token_id.to_felts();
        ctx.emit_event(APPROVAL_EVENT_NAME, vec![owner, to, low, high]);
        Ok(())
    }

    /// Increments an account's balance
    fn add_to_balance(
        ctx: &mut ExecutionContext,
        account: FieldElement,
    ) -> Result<(), ExecutionError> {
        let balance = ERC721_BALANCES
            .read_uint256(ctx, &[account])?
            .checked_add(Uint256::from(1_u128))
            .ok_or(Erc721Error::BalanceOverflow)?;
        ERC721_BALANCES.write_uint256(ctx, &[account], balance)
    }

    /// Decrements an account's balance
    fn sub_from_balance(
        ctx: &mut ExecutionContext,
        account: FieldElement,
    ) -> Result<(), ExecutionError> {
        let balance = ERC721_BALANCES
            .read_uint256(ctx, &[account])?
            .checked_sub(Uint256::from(1_u128))
            .ok_or(Erc721Error::BalanceOverflow)?;
        ERC721_BALANCES.write_uint256(ctx, &[account], balance)
    }

    /// Emits a `Transfer` event
    fn emit_transfer(
        ctx: &mut ExecutionContext,
        from: FieldElement,
        to: FieldElement,
        token_id: Uint256,
    ) {
        let [low, high] = token_id.to_felts();
        ctx.emit_event(TRANSFER_EVENT_NAME, vec![from, to, low, high]);
    }
}
