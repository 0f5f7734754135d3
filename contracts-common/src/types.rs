//! Common types used by the contract models, the deploy scripts & the tests

use std::{cmp::Ordering, fmt, str::FromStr};

use ruint::aliases::U256;
use serde::{Deserialize, Serialize};
use starknet::core::types::FieldElement;

use crate::{
    calldata::CalldataSerializable,
    constants::{NUM_BYTES_FELT, NUM_BYTES_U128},
    encoding::felt_to_u128,
    errors::EncodingError,
};

/// An unsigned 256-bit integer, represented as two 128-bit limbs
/// in the same way Cairo's `Uint256` struct is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uint256 {
    /// The low 128 bits
    pub low: u128,
    /// The high 128 bits
    pub high: u128,
}

impl Uint256 {
    /// The zero value
    pub const ZERO: Uint256 = Uint256 { low: 0, high: 0 };

    /// Constructs a `Uint256` from its limbs
    pub const fn new(low: u128, high: u128) -> Self {
        Self { low, high }
    }

    /// Parses a decimal or `0x`-prefixed hex numeral of up to 256 bits
    pub fn from_dec_str(numeral: &str) -> Result<Self, EncodingError> {
        let value = U256::from_str(numeral.trim())
            .map_err(|_| EncodingError::InvalidNumeral(numeral.to_string()))?;
        Ok(Self::from(value))
    }

    /// Reconstructs a `Uint256` from its two field element limbs,
    /// failing if either limb exceeds 128 bits
    pub fn from_felts(low: FieldElement, high: FieldElement) -> Result<Self, EncodingError> {
        Ok(Self {
            low: felt_to_u128(low)?,
            high: felt_to_u128(high)?,
        })
    }

    /// The limbs as field elements, low limb first
    pub fn to_felts(&self) -> [FieldElement; 2] {
        [FieldElement::from(self.low), FieldElement::from(self.high)]
    }

    /// The value as a `ruint` integer
    pub fn to_u256(&self) -> U256 {
        (U256::from(self.high) << 128) | U256::from(self.low)
    }

    /// Adds `rhs`, returning `None` on overflow
    pub fn checked_add(&self, rhs: Uint256) -> Option<Uint256> {
        self.to_u256().checked_add(rhs.to_u256()).map(Uint256::from)
    }

    /// Subtracts `rhs`, returning `None` on underflow
    pub fn checked_sub(&self, rhs: Uint256) -> Option<Uint256> {
        self.to_u256().checked_sub(rhs.to_u256()).map(Uint256::from)
    }

    /// Whether this is the zero value
    pub fn is_zero(&self) -> bool {
        self.low == 0 && self.high == 0
    }
}

impl From<u128> for Uint256 {
    fn from(value: u128) -> Self {
        Self {
            low: value,
            high: 0,
        }
    }
}

impl From<U256> for Uint256 {
    fn from(value: U256) -> Self {
        let bytes = value.to_be_bytes::<NUM_BYTES_FELT>();
        let mut high = [0_u8; NUM_BYTES_U128];
        let mut low = [0_u8; NUM_BYTES_U128];
        high.copy_from_slice(&bytes[..NUM_BYTES_U128]);
        low.copy_from_slice(&bytes[NUM_BYTES_U128..]);

        Self {
            low: u128::from_be_bytes(low),
            high: u128::from_be_bytes(high),
        }
    }
}

impl Ord for Uint256 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.high
            .cmp(&other.high)
            .then_with(|| self.low.cmp(&other.low))
    }
}

impl PartialOrd for Uint256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_u256())
    }
}

impl CalldataSerializable for Uint256 {
    fn to_calldata(&self) -> Vec<FieldElement> {
        self.to_felts().to_vec()
    }
}

/// A single contract invocation, as bundled into an account's multicall
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// The address of the contract being invoked
    pub to: FieldElement,
    /// The selector of the entry point being invoked
    pub selector: FieldElement,
    /// The calldata passed to the entry point
    pub calldata: Vec<FieldElement>,
}

impl CalldataSerializable for Call {
    fn to_calldata(&self) -> Vec<FieldElement> {
        let mut calldata = vec![self.to, self.selector];
        calldata.extend(self.calldata.to_calldata());
        calldata
    }
}

/// The arguments of `MystisNFT`'s `initializer`, in calldata order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitializerArgs {
    /// The collection name, as a short string
    pub name: FieldElement,
    /// The collection symbol, as a short string
    pub symbol: FieldElement,
    /// The collection owner
    pub owner: FieldElement,
    /// The base token URI, split into short strings
    pub token_uri: Vec<FieldElement>,
    /// The token URI suffix, as a short string
    pub token_uri_suffix: FieldElement,
    /// The maximum number of tokens that can be minted
    pub max_supply: Uint256,
    /// The admin of the proxy
    pub proxy_admin: FieldElement,
}

impl CalldataSerializable for InitializerArgs {
    fn to_calldata(&self) -> Vec<FieldElement> {
        let mut calldata = vec![self.name, self.symbol, self.owner];
        calldata.extend(self.token_uri.to_calldata());
        calldata.push(self.token_uri_suffix);
        calldata.extend(self.max_supply.to_calldata());
        calldata.push(self.proxy_admin);
        calldata
    }
}

/// The arguments of `MystisProxy`'s constructor, in calldata order.
///
/// The initializer calldata is passed as a Cairo array, i.e. prefixed by its length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConstructorArgs {
    /// The class hash of the implementation contract
    pub implementation_hash: FieldElement,
    /// The selector of the entry point the constructor library-calls
    pub selector: FieldElement,
    /// The calldata passed to that entry point
    pub calldata: Vec<FieldElement>,
}

impl CalldataSerializable for ProxyConstructorArgs {
    fn to_calldata(&self) -> Vec<FieldElement> {
        let mut calldata = vec![self.implementation_hash, self.selector];
        calldata.extend(self.calldata.to_calldata());
        calldata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint256_from_dec_str_splits_limbs() {
        let value = Uint256::from_dec_str("340282366920938463463374607431768211457").unwrap();
        assert_eq!(value, Uint256::new(1, 1));

        let value = Uint256::from_dec_str("0x10").unwrap();
        assert_eq!(value, Uint256::from(16_u128));
    }

    #[test]
    fn test_uint256_ordering_uses_high_limb_first() {
        assert!(Uint256::new(0, 1) > Uint256::new(u128::MAX, 0));
        assert!(Uint256::from(7_u128) < Uint256::from(8_u128));
    }

    #[test]
    fn test_uint256_checked_add_carries() {
        let sum = Uint256::new(u128::MAX, 0)
            .checked_add(Uint256::from(1_u128))
            .unwrap();
        assert_eq!(sum, Uint256::new(0, 1));
        assert!(Uint256::new(u128::MAX, u128::MAX)
            .checked_add(Uint256::from(1_u128))
            .is_none());
    }

    #[test]
    fn test_proxy_constructor_args_prefix_initializer_len() {
        let args = ProxyConstructorArgs {
            implementation_hash: FieldElement::from(10_u8),
            selector: FieldElement::from(20_u8),
            calldata: vec![FieldElement::from(1_u8), FieldElement::from(2_u8)],
        };

        assert_eq!(
            args.to_calldata(),
            vec![
                FieldElement::from(10_u8),
                FieldElement::from(20_u8),
                FieldElement::from(2_u8),
                FieldElement::from(1_u8),
                FieldElement::from(2_u8),
            ]
        );
    }
}
