//! Conversions between Rust values & the field elements expected by the contracts.
//!
//! Strings are packed as Cairo short strings, i.e. up to 31 ASCII characters per field element,
//! and integers wider than a field element are split into `Uint256` limbs.

use starknet::core::{
    types::FieldElement,
    utils::{cairo_short_string_to_felt, get_selector_from_name, parse_cairo_short_string},
};

use crate::{constants::SHORT_STRING_MAX_LEN, errors::EncodingError, types::Uint256};

/// Packs a string of at most 31 ASCII characters into a single field element
pub fn str_to_felt(s: &str) -> Result<FieldElement, EncodingError> {
    if !s.is_ascii() {
        return Err(EncodingError::NonAscii(s.to_string()));
    }
    if s.len() > SHORT_STRING_MAX_LEN {
        return Err(EncodingError::ShortStringTooLong(s.to_string()));
    }

    cairo_short_string_to_felt(s).map_err(|_| EncodingError::ShortStringTooLong(s.to_string()))
}

/// The selector of the entry point with the given name
pub fn selector(name: &str) -> Result<FieldElement, EncodingError> {
    get_selector_from_name(name).map_err(|_| EncodingError::NonAscii(name.to_string()))
}

/// Unpacks a short string from a field element
pub fn felt_to_str(felt: FieldElement) -> Result<String, EncodingError> {
    parse_cairo_short_string(&felt)
        .map_err(|_| EncodingError::InvalidShortString(felt_to_dec_str(felt)))
}

/// Splits a string of arbitrary length into consecutive short strings.
///
/// The number of elements is the array length expected by the contracts.
pub fn long_str_to_array(s: &str) -> Result<Vec<FieldElement>, EncodingError> {
    if !s.is_ascii() {
        return Err(EncodingError::NonAscii(s.to_string()));
    }

    // Chunking bytes is safe, every character of an ASCII string is a single byte
    s.as_bytes()
        .chunks(SHORT_STRING_MAX_LEN)
        .map(|chunk| {
            let chunk = std::str::from_utf8(chunk)
                .map_err(|_| EncodingError::NonAscii(s.to_string()))?;
            str_to_felt(chunk)
        })
        .collect()
}

/// Joins consecutive short strings back into a single string
pub fn array_to_long_str(felts: &[FieldElement]) -> Result<String, EncodingError> {
    felts.iter().map(|felt| felt_to_str(*felt)).collect()
}

/// Splits an integer into its `Uint256` limbs
pub fn to_uint(value: u128) -> Uint256 {
    Uint256::from(value)
}

/// Converts a decimal numeral in the field's range to its `0x`-prefixed hex form
pub fn decimal_to_hex(decimal: &str) -> Result<String, EncodingError> {
    let felt = FieldElement::from_dec_str(decimal.trim())
        .map_err(|_| EncodingError::InvalidNumeral(decimal.to_string()))?;
    Ok(format!("{felt:#x}"))
}

/// Converts a `0x`-prefixed hex numeral in the field's range to its decimal form
pub fn hex_to_decimal(hex: &str) -> Result<String, EncodingError> {
    hex_to_felt(hex).map(felt_to_dec_str)
}

/// Parses a `0x`-prefixed hex numeral into a field element
pub fn hex_to_felt(hex: &str) -> Result<FieldElement, EncodingError> {
    FieldElement::from_hex_be(hex.trim())
        .map_err(|_| EncodingError::InvalidNumeral(hex.to_string()))
}

/// Parses either a decimal or a `0x`-prefixed hex numeral into a field element
pub fn parse_felt(numeral: &str) -> Result<FieldElement, EncodingError> {
    let numeral = numeral.trim();
    if numeral.starts_with("0x") || numeral.starts_with("0X") {
        hex_to_felt(numeral)
    } else {
        FieldElement::from_dec_str(numeral)
            .map_err(|_| EncodingError::InvalidNumeral(numeral.to_string()))
    }
}

/// Formats a field element as a decimal numeral
pub fn felt_to_dec_str(felt: FieldElement) -> String {
    felt.to_string()
}

/// Converts a field element to a `u128`, failing if it exceeds 128 bits
pub fn felt_to_u128(felt: FieldElement) -> Result<u128, EncodingError> {
    u128::try_from(felt).map_err(|_| EncodingError::OutOfRange(felt_to_dec_str(felt)))
}

/// Converts a field element to a `usize`, failing if it does not fit
pub fn felt_to_usize(felt: FieldElement) -> Result<usize, EncodingError> {
    usize::try_from(felt_to_u128(felt)?)
        .map_err(|_| EncodingError::OutOfRange(felt_to_dec_str(felt)))
}
