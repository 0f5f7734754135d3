//! Errors stemming from value encoding & calldata (de)serialization

use thiserror::Error;

/// Errors that can occur while converting values to & from field elements
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A string does not fit into a single short string
    #[error("short string `{0}` exceeds 31 characters")]
    ShortStringTooLong(String),
    /// A string contains characters outside of the ASCII range
    #[error("string `{0}` is not ASCII")]
    NonAscii(String),
    /// A field element does not decode to a valid short string
    #[error("field element {0} is not a valid short string")]
    InvalidShortString(String),
    /// A numeral could not be parsed
    #[error("invalid numeral `{0}`")]
    InvalidNumeral(String),
    /// A value does not fit in the target integer type
    #[error("value {0} out of range")]
    OutOfRange(String),
    /// The calldata ended before all expected values were read
    #[error("calldata too short: expected at least {expected} elements, got {actual}")]
    CalldataTooShort {
        /// The number of elements required
        expected: usize,
        /// The number of elements available
        actual: usize,
    },
    /// The calldata holds more values than the entry point consumes
    #[error("calldata has {0} unexpected trailing elements")]
    TrailingCalldata(usize),
    /// An ABI could not be parsed
    #[error("error parsing ABI: {0}")]
    Abi(String),
}
